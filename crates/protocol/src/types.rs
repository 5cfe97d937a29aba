//! Core protocol types used across the wire.
//!
//! These types represent primitive values and enums used in WDS requests and responses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Device-assigned identifier of one active data session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketDataHandle(pub u32);

impl PacketDataHandle {
	/// Reserved handle asking the device to tear down without naming a session.
	///
	/// Only meaningful together with the autoconnect-disable flag.
	pub const IMPLICIT: PacketDataHandle = PacketDataHandle(0xFFFF_FFFF);

	pub fn get(self) -> u32 {
		self.0
	}

	pub fn is_implicit(self) -> bool {
		self == Self::IMPLICIT
	}
}

impl fmt::Display for PacketDataHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Authentication protocol preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Authentication {
	/// No authentication
	None,
	/// PAP only
	Pap,
	/// CHAP only
	Chap,
	/// PAP or CHAP, device chooses
	Both,
}

impl fmt::Display for Authentication {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Authentication::None => write!(f, "none"),
			Authentication::Pap => write!(f, "pap"),
			Authentication::Chap => write!(f, "chap"),
			Authentication::Both => write!(f, "pap, chap"),
		}
	}
}

/// IP family preference for a data session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
	Ipv4,
	Ipv6,
}

impl fmt::Display for IpFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			IpFamily::Ipv4 => write!(f, "IPv4"),
			IpFamily::Ipv6 => write!(f, "IPv6"),
		}
	}
}

/// Packet service connection status reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionStatus {
	Disconnected,
	Connected,
	Suspended,
	Authenticating,
	/// Any status this crate does not know about
	#[serde(other)]
	Unknown,
}

impl ConnectionStatus {
	/// Only the literal connected state counts as connected.
	pub fn is_connected(self) -> bool {
		self == ConnectionStatus::Connected
	}
}

impl fmt::Display for ConnectionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			ConnectionStatus::Disconnected => "disconnected",
			ConnectionStatus::Connected => "connected",
			ConnectionStatus::Suspended => "suspended",
			ConnectionStatus::Authenticating => "authenticating",
			ConnectionStatus::Unknown => "unknown",
		};
		f.write_str(s)
	}
}

/// Profile family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileType {
	#[serde(rename = "3gpp")]
	ThreeGpp,
	#[serde(rename = "3gpp2")]
	ThreeGpp2,
}

impl fmt::Display for ProfileType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProfileType::ThreeGpp => write!(f, "3gpp"),
			ProfileType::ThreeGpp2 => write!(f, "3gpp2"),
		}
	}
}

/// Identifies one stored profile on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileId {
	pub profile_type: ProfileType,
	pub profile_index: u8,
}

/// One entry of the device's profile list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDescriptor {
	pub profile_index: u8,
	pub profile_type: ProfileType,
	#[serde(default)]
	pub profile_name: String,
}

impl ProfileDescriptor {
	pub fn id(&self) -> ProfileId {
		ProfileId {
			profile_type: self.profile_type,
			profile_index: self.profile_index,
		}
	}
}

/// PDP context type stored in a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PdpType {
	Ipv4,
	Ppp,
	Ipv6,
	Ipv4OrIpv6,
	#[serde(other)]
	Unknown,
}

impl fmt::Display for PdpType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			PdpType::Ipv4 => "ipv4",
			PdpType::Ppp => "ppp",
			PdpType::Ipv6 => "ipv6",
			PdpType::Ipv4OrIpv6 => "ipv4-or-ipv6",
			PdpType::Unknown => "unknown",
		};
		f.write_str(s)
	}
}

/// Autoconnect behaviour of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoconnectSetting {
	Disabled,
	Enabled,
	Paused,
}

impl fmt::Display for AutoconnectSetting {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AutoconnectSetting::Disabled => write!(f, "disabled"),
			AutoconnectSetting::Enabled => write!(f, "enabled"),
			AutoconnectSetting::Paused => write!(f, "paused"),
		}
	}
}

/// Whether autoconnect also applies while roaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoconnectRoaming {
	Allowed,
	HomeOnly,
}

impl fmt::Display for AutoconnectRoaming {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AutoconnectRoaming::Allowed => write!(f, "allowed"),
			AutoconnectRoaming::HomeOnly => write!(f, "home-only"),
		}
	}
}

/// Dormancy state of the active data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DormancyStatus {
	Dormant,
	TrafficChannelActive,
	#[serde(other)]
	Unknown,
}

impl fmt::Display for DormancyStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DormancyStatus::Dormant => write!(f, "dormant"),
			DormancyStatus::TrafficChannelActive => write!(f, "traffic-channel-active"),
			DormancyStatus::Unknown => write!(f, "unknown"),
		}
	}
}

/// Network family of a data bearer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkType {
	#[serde(rename = "3gpp")]
	ThreeGpp,
	#[serde(rename = "3gpp2")]
	ThreeGpp2,
	#[default]
	#[serde(other, rename = "unknown")]
	Unknown,
}

impl fmt::Display for NetworkType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NetworkType::ThreeGpp => write!(f, "3gpp"),
			NetworkType::ThreeGpp2 => write!(f, "3gpp2"),
			NetworkType::Unknown => write!(f, "unknown"),
		}
	}
}

/// Peripheral endpoint class for mux data port binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
	/// High-speed USB data endpoint
	Hsusb,
	Pcie,
	Embedded,
}

/// Client type announced when binding a mux data port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
	Tethered,
}

/// Protocol-level error classification carried by failed responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolErrorCode {
	/// The call was rejected by the network; call end reasons may be attached.
	CallFailed,
	/// No data call is active.
	OutOfCall,
	/// Device-internal failure with an extended error code attached.
	ExtendedInternal,
	NoEffect,
	InvalidHandle,
	/// Any code this crate does not special-case.
	Other(String),
}

impl ProtocolErrorCode {
	pub fn from_wire(code: &str) -> Self {
		match code {
			"call-failed" => ProtocolErrorCode::CallFailed,
			"out-of-call" => ProtocolErrorCode::OutOfCall,
			"extended-internal" => ProtocolErrorCode::ExtendedInternal,
			"no-effect" => ProtocolErrorCode::NoEffect,
			"invalid-handle" => ProtocolErrorCode::InvalidHandle,
			other => ProtocolErrorCode::Other(other.to_string()),
		}
	}
}
