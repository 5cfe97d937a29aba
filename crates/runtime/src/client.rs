//! The seam between command logic and the device connection.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use wds_protocol::WdsMessage;

use crate::error::Result;

/// Anything that can carry a WDS request to a device and return its result.
///
/// [`Connection`](crate::Connection) is the production implementation; tests
/// substitute scripted fakes.
pub trait DeviceClient: Send + Sync {
	/// Send a raw request and await the response for at most `deadline`.
	fn send_message(
		&self,
		message: &str,
		params: Value,
		deadline: Duration,
	) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>>;
}

impl dyn DeviceClient + '_ {
	/// Sends a typed request and decodes its typed output.
	pub async fn call<M>(&self, input: &M, deadline: Duration) -> Result<M::Output>
	where
		M: WdsMessage + Sync,
	{
		let params = serde_json::to_value(input)?;
		let value = self.send_message(M::NAME, params, deadline).await?;
		Ok(serde_json::from_value(value)?)
	}
}
