//! Error types for the WDS runtime.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use wds_protocol::ProtocolErrorCode;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a device.
#[derive(Debug, Error)]
pub enum Error {
	/// Failed to open the device endpoint.
	#[error("Failed to connect to device: {0}")]
	ConnectionFailed(String),

	/// Transport-level error (framing, socket I/O).
	#[error("Transport error: {0}")]
	TransportError(String),

	/// Protocol-level error (unexpected envelope, unknown request id).
	#[error("Protocol error: {0}")]
	ProtocolError(String),

	/// The device answered with a failure.
	#[error("{message}")]
	Device {
		/// Wire error code (e.g. "call-failed")
		code: String,
		/// Human-readable error message
		message: String,
		/// Message-specific failure fields
		details: Option<Value>,
	},

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// No response arrived within the request deadline.
	#[error("Timeout: {0}")]
	Timeout(String),

	/// Channel closed unexpectedly.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,
}

impl Error {
	/// Returns the classified protocol code if the device reported a failure.
	pub fn protocol_code(&self) -> Option<ProtocolErrorCode> {
		match self {
			Error::Device { code, .. } => Some(ProtocolErrorCode::from_wire(code)),
			_ => None,
		}
	}

	/// Decodes the failure details of a device error into a typed struct.
	///
	/// Returns `None` when this is not a device error, no details were sent,
	/// or they do not match `T`.
	pub fn failure_details<T: DeserializeOwned>(&self) -> Option<T> {
		match self {
			Error::Device {
				details: Some(details),
				..
			} => serde_json::from_value(details.clone()).ok(),
			_ => None,
		}
	}

	/// Returns true if the device itself rejected the request.
	pub fn is_device_error(&self) -> bool {
		matches!(self, Error::Device { .. })
	}

	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout(_))
	}
}
