//! Opening a device endpoint and running its connection.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::client::DeviceClient;
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::transport::PipeTransport;

/// Where the device service listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAddress {
	/// Unix domain socket path
	Unix(PathBuf),
	/// `host:port` of a TCP endpoint
	Tcp(String),
}

impl FromStr for DeviceAddress {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let s = s.trim();
		if s.is_empty() {
			return Err(Error::ConnectionFailed("device path is empty".to_string()));
		}
		match s.strip_prefix("tcp:") {
			Some("") => Err(Error::ConnectionFailed(
				"tcp device address needs host:port".to_string(),
			)),
			Some(addr) => Ok(DeviceAddress::Tcp(addr.to_string())),
			None => Ok(DeviceAddress::Unix(PathBuf::from(s))),
		}
	}
}

impl fmt::Display for DeviceAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DeviceAddress::Unix(path) => write!(f, "{}", path.display()),
			DeviceAddress::Tcp(addr) => write!(f, "tcp:{addr}"),
		}
	}
}

/// An open device: a running connection plus its dispatch task.
pub struct Device {
	address: DeviceAddress,
	connection: Arc<Connection>,
	run_handle: JoinHandle<()>,
}

impl Device {
	/// Connects to `address`, giving up after `deadline`.
	pub async fn open(address: DeviceAddress, deadline: Duration) -> Result<Self> {
		let connection = match tokio::time::timeout(deadline, connect(&address)).await {
			Ok(result) => result?,
			Err(_) => {
				return Err(Error::Timeout(format!(
					"opening {address} took longer than {deadline:?}"
				)));
			}
		};
		let connection = Arc::new(connection);

		let runner = Arc::clone(&connection);
		let run_handle = tokio::spawn(async move {
			if let Err(e) = runner.run().await {
				tracing::error!("device connection loop failed: {}", e);
			}
			tracing::debug!("device connection closed");
		});

		tracing::debug!(%address, "device opened");
		Ok(Self {
			address,
			connection,
			run_handle,
		})
	}

	pub fn address(&self) -> &DeviceAddress {
		&self.address
	}

	/// Shared client handle for issuing requests.
	pub fn client(&self) -> Arc<dyn DeviceClient> {
		self.connection.clone()
	}
}

impl Drop for Device {
	fn drop(&mut self) {
		self.run_handle.abort();
	}
}

async fn connect(address: &DeviceAddress) -> Result<Connection> {
	match address {
		DeviceAddress::Unix(path) => connect_unix(path).await,
		DeviceAddress::Tcp(addr) => {
			let stream = tokio::net::TcpStream::connect(addr.as_str())
				.await
				.map_err(|e| Error::ConnectionFailed(format!("{address}: {e}")))?;
			stream.set_nodelay(true)?;
			let (read, write) = stream.into_split();
			let (transport, message_rx) = PipeTransport::new(write, read);
			Ok(Connection::new(transport.into_transport_parts(message_rx)))
		}
	}
}

#[cfg(unix)]
async fn connect_unix(path: &std::path::Path) -> Result<Connection> {
	let stream = tokio::net::UnixStream::connect(path)
		.await
		.map_err(|e| Error::ConnectionFailed(format!("{}: {e}", path.display())))?;
	let (read, write) = stream.into_split();
	let (transport, message_rx) = PipeTransport::new(write, read);
	Ok(Connection::new(transport.into_transport_parts(message_rx)))
}

#[cfg(not(unix))]
async fn connect_unix(path: &std::path::Path) -> Result<Connection> {
	Err(Error::ConnectionFailed(format!(
		"{}: unix sockets are not supported on this platform",
		path.display()
	)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_unix_and_tcp_addresses() {
		assert_eq!(
			"/dev/cdc-wdm0.sock".parse::<DeviceAddress>().unwrap(),
			DeviceAddress::Unix(PathBuf::from("/dev/cdc-wdm0.sock"))
		);
		assert_eq!(
			"tcp:127.0.0.1:5000".parse::<DeviceAddress>().unwrap(),
			DeviceAddress::Tcp("127.0.0.1:5000".to_string())
		);
	}

	#[test]
	fn rejects_empty_addresses() {
		assert!("".parse::<DeviceAddress>().is_err());
		assert!("tcp:".parse::<DeviceAddress>().is_err());
	}

	#[test]
	fn display_round_trips_prefix() {
		let addr = DeviceAddress::Tcp("modem:7000".into());
		assert_eq!(addr.to_string(), "tcp:modem:7000");
	}
}
