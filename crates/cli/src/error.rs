use serde_json::Value;
use thiserror::Error;
use wds_protocol::{ProfileFailure, ProtocolErrorCode, StartNetworkFailure};

use crate::output::{CommandError, ErrorCode};
use crate::properties::PropertyError;
use crate::session::SessionState;

pub type Result<T> = std::result::Result<T, WdsError>;

#[derive(Debug, Error)]
pub enum WdsError {
	#[error(transparent)]
	Property(#[from] PropertyError),

	#[error("{0}")]
	InvalidInput(String),

	/// The request never got a device answer (timeout, closed connection).
	#[error("operation failed: {0}")]
	Transport(#[source] wds_runtime::Error),

	/// The device answered with a failure.
	#[error("couldn't {action}: {message}")]
	Device {
		action: &'static str,
		code: String,
		message: String,
		details: Option<Value>,
	},

	/// Ctrl+C arrived while nothing was listening for it.
	#[error("operation cancelled")]
	Interrupted,

	#[error("session cannot move from {from} to {to}")]
	InvalidTransition { from: SessionState, to: SessionState },

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl WdsError {
	/// Classifies a runtime failure of the request performing `action`.
	pub fn from_runtime(action: &'static str, err: wds_runtime::Error) -> Self {
		match err {
			wds_runtime::Error::Device {
				code,
				message,
				details,
			} => WdsError::Device {
				action,
				code,
				message,
				details,
			},
			other => WdsError::Transport(other),
		}
	}

	pub(crate) fn protocol_code(&self) -> Option<ProtocolErrorCode> {
		match self {
			WdsError::Device { code, .. } => Some(ProtocolErrorCode::from_wire(code)),
			_ => None,
		}
	}

	/// Failure details of a device error, decoded as `T`.
	pub(crate) fn details<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
		match self {
			WdsError::Device {
				details: Some(details),
				..
			} => serde_json::from_value(details.clone()).ok(),
			_ => None,
		}
	}

	/// Lines reported to the operator for this error, primary message first.
	///
	/// A failed call carries its end reasons as extra lines; an extended
	/// internal failure with a profile-database code replaces the message
	/// with that code.
	pub fn report_lines(&self) -> Vec<String> {
		match (self, self.protocol_code()) {
			(WdsError::Device { action, .. }, Some(ProtocolErrorCode::ExtendedInternal)) => {
				match self.details::<ProfileFailure>().and_then(|f| f.extended_error_code) {
					Some(ds) => vec![format!("couldn't {action}: ds profile error: {ds}")],
					None => vec![self.to_string()],
				}
			}
			(WdsError::Device { .. }, Some(ProtocolErrorCode::CallFailed)) => {
				let mut lines = vec![self.to_string()];
				if let Some(failure) = self.details::<StartNetworkFailure>() {
					if let Some(reason) = failure.call_end_reason {
						lines.push(reason.to_string());
					}
					if let Some(verbose) = failure.verbose_call_end_reason {
						lines.push(verbose.to_string());
					}
				}
				lines
			}
			(WdsError::Anyhow(err), _) => vec![format!("{err:#}")],
			_ => vec![self.to_string()],
		}
	}

	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, details) = match self {
			WdsError::Property(_) | WdsError::InvalidInput(_) => (ErrorCode::InvalidInput, None),
			WdsError::Transport(err) if err.is_timeout() => (ErrorCode::Timeout, None),
			WdsError::Transport(wds_runtime::Error::ConnectionFailed(_)) => {
				(ErrorCode::ConnectionFailed, None)
			}
			WdsError::Transport(_) => (ErrorCode::TransportError, None),
			WdsError::Device { code, details, .. } => (
				ErrorCode::DeviceError,
				Some(serde_json::json!({ "code": code, "details": details })),
			),
			WdsError::Interrupted => (ErrorCode::Cancelled, None),
			WdsError::InvalidTransition { .. } | WdsError::Anyhow(_) => {
				(ErrorCode::InternalError, None)
			}
		};

		CommandError {
			code,
			message: self.report_lines().join("; "),
			details,
		}
	}
}
