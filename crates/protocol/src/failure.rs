//! Failure details attached to unsuccessful responses.
//!
//! A failed response carries a protocol error code and, for some messages,
//! extra typed fields explaining the failure. These arrive in the `details`
//! object of the error envelope and decode into the structs below.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generic reason the network ended (or refused) a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEndReason {
	pub code: u16,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

impl fmt::Display for CallEndReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "call end reason ({}): {}", self.code, self.name.as_deref().unwrap_or("unknown"))
	}
}

/// Reason qualified by the subsystem that ended the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerboseCallEndReason {
	pub reason_type: u16,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub type_name: Option<String>,
	pub reason: i16,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reason_name: Option<String>,
}

impl fmt::Display for VerboseCallEndReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"verbose call end reason ({},{}): [{}] {}",
			self.reason_type,
			self.reason,
			self.type_name.as_deref().unwrap_or("unknown"),
			self.reason_name.as_deref().unwrap_or("unknown"),
		)
	}
}

/// Extended profile-database error code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsProfileError {
	pub code: u16,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

impl fmt::Display for DsProfileError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.name {
			Some(name) => f.write_str(name),
			None => write!(f, "unknown ({})", self.code),
		}
	}
}

/// Extra fields of a failed start-network response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartNetworkFailure {
	pub call_end_reason: Option<CallEndReason>,
	pub verbose_call_end_reason: Option<VerboseCallEndReason>,
}

/// Extra fields of a failed profile operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFailure {
	pub extended_error_code: Option<DsProfileError>,
}
