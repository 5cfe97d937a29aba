//! Request inputs and response outputs for each WDS message.
//!
//! Every request type implements [`WdsMessage`], which binds the kebab-case
//! wire name to the output type the device answers with. Messages without a
//! meaningful result use [`IgnoredAny`] as their output.

use std::net::{Ipv4Addr, Ipv6Addr};

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::types::{
	Authentication, AutoconnectRoaming, AutoconnectSetting, ClientType, ConnectionStatus,
	DormancyStatus, EndpointType, IpFamily, NetworkType, PacketDataHandle, PdpType,
	ProfileDescriptor, ProfileId, ProfileType,
};

/// A request the device understands, with its wire name and response shape.
pub trait WdsMessage: Serialize {
	/// Message name as it appears in the request envelope.
	const NAME: &'static str;
	/// Typed result of a successful exchange.
	type Output: DeserializeOwned;
}

macro_rules! wds_message {
	($input:ty => $output:ty, $name:literal) => {
		impl WdsMessage for $input {
			const NAME: &'static str = $name;
			type Output = $output;
		}
	};
}

/// Parameters of a start-network request. Absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartNetworkInput {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub apn: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub profile_index_3gpp: Option<u8>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub profile_index_3gpp2: Option<u8>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub authentication_preference: Option<Authentication>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub password: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ip_family_preference: Option<IpFamily>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub enable_autoconnect: Option<bool>,
}

impl StartNetworkInput {
	/// True when no field is set and the device defaults apply.
	pub fn is_empty(&self) -> bool {
		*self == StartNetworkInput::default()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartNetworkOutput {
	pub packet_data_handle: PacketDataHandle,
}

wds_message!(StartNetworkInput => StartNetworkOutput, "start-network");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopNetworkInput {
	pub packet_data_handle: PacketDataHandle,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub disable_autoconnect: Option<bool>,
}

wds_message!(StopNetworkInput => IgnoredAny, "stop-network");

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GetPacketServiceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketServiceStatusOutput {
	pub connection_status: ConnectionStatus,
}

wds_message!(GetPacketServiceStatus => PacketServiceStatusOutput, "get-packet-service-status");

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GetPacketStatistics;

/// Packet counters. 32-bit counters equal to [`PacketStatistics::UNAVAILABLE`]
/// were not collected by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketStatistics {
	pub tx_packets_ok: Option<u32>,
	pub rx_packets_ok: Option<u32>,
	pub tx_packets_error: Option<u32>,
	pub rx_packets_error: Option<u32>,
	pub tx_overflows: Option<u32>,
	pub rx_overflows: Option<u32>,
	pub tx_packets_dropped: Option<u32>,
	pub rx_packets_dropped: Option<u32>,
	pub tx_bytes_ok: Option<u64>,
	pub rx_bytes_ok: Option<u64>,
	pub last_call_tx_bytes_ok: Option<u64>,
	pub last_call_rx_bytes_ok: Option<u64>,
}

impl PacketStatistics {
	pub const UNAVAILABLE: u32 = 0xFFFF_FFFF;
}

wds_message!(GetPacketStatistics => PacketStatistics, "get-packet-statistics");

/// Settings groups that can be requested from get-current-settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestedSetting {
	DnsAddress,
	GrantedQos,
	IpAddress,
	GatewayInfo,
	Mtu,
	DomainNameList,
	IpFamily,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCurrentSettingsInput {
	pub requested_settings: Vec<RequestedSetting>,
}

impl GetCurrentSettingsInput {
	/// Requests every settings group.
	pub fn all() -> Self {
		Self {
			requested_settings: vec![
				RequestedSetting::DnsAddress,
				RequestedSetting::GrantedQos,
				RequestedSetting::IpAddress,
				RequestedSetting::GatewayInfo,
				RequestedSetting::Mtu,
				RequestedSetting::DomainNameList,
				RequestedSetting::IpFamily,
			],
		}
	}
}

/// IPv6 address with its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv6Prefixed {
	pub address: Ipv6Addr,
	pub prefix_length: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentSettings {
	pub ip_family: Option<IpFamily>,
	pub ipv4_address: Option<Ipv4Addr>,
	pub ipv4_subnet_mask: Option<Ipv4Addr>,
	pub ipv4_gateway_address: Option<Ipv4Addr>,
	pub ipv4_primary_dns: Option<Ipv4Addr>,
	pub ipv4_secondary_dns: Option<Ipv4Addr>,
	pub ipv6_address: Option<Ipv6Prefixed>,
	pub ipv6_gateway_address: Option<Ipv6Prefixed>,
	pub ipv6_primary_dns: Option<Ipv6Addr>,
	pub ipv6_secondary_dns: Option<Ipv6Addr>,
	pub mtu: Option<u32>,
	pub domain_name_list: Option<Vec<String>>,
}

wds_message!(GetCurrentSettingsInput => CurrentSettings, "get-current-settings");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProfileListInput {
	pub profile_type: ProfileType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileListOutput {
	#[serde(default)]
	pub profile_list: Vec<ProfileDescriptor>,
}

wds_message!(GetProfileListInput => ProfileListOutput, "get-profile-list");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProfileSettingsInput {
	pub profile_id: ProfileId,
}

/// Stored settings of one profile (also used for the default settings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
	pub apn_name: Option<String>,
	pub pdp_type: Option<PdpType>,
	pub username: Option<String>,
	pub password: Option<String>,
	pub authentication: Option<Authentication>,
}

wds_message!(GetProfileSettingsInput => ProfileSettings, "get-profile-settings");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDefaultSettingsInput {
	pub profile_type: ProfileType,
}

wds_message!(GetDefaultSettingsInput => ProfileSettings, "get-default-settings");

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GetAutoconnectSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoconnectSettings {
	pub status: AutoconnectSetting,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub roaming: Option<AutoconnectRoaming>,
}

wds_message!(GetAutoconnectSettings => AutoconnectSettings, "get-autoconnect-settings");
wds_message!(AutoconnectSettings => IgnoredAny, "set-autoconnect-settings");

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GetDormancyStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DormancyStatusOutput {
	#[serde(default)]
	pub dormancy_status: Option<DormancyStatus>,
}

wds_message!(GetDormancyStatus => DormancyStatusOutput, "get-dormancy-status");

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GoDormant;

wds_message!(GoDormant => IgnoredAny, "go-dormant");

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GoActive;

wds_message!(GoActive => IgnoredAny, "go-active");

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Reset;

wds_message!(Reset => IgnoredAny, "reset");

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GetDataBearerTechnology;

/// Bearer technology names (`lte`, `hsdpa`, ...). Also carried in the
/// details of an out-of-call failure, with only `last` set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataBearerTechnologyOutput {
	pub current: Option<String>,
	pub last: Option<String>,
}

wds_message!(GetDataBearerTechnology => DataBearerTechnologyOutput, "get-data-bearer-technology");

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GetCurrentDataBearerTechnology;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataBearer {
	pub network_type: NetworkType,
	/// Radio access technologies in use, by name.
	pub radio_access_technology: Vec<String>,
	/// Service options in use, by name. Only reported for CDMA 1x and EV-DO Rev A.
	pub service_option: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentDataBearerTechnologyOutput {
	pub current: Option<DataBearer>,
	pub last: Option<DataBearer>,
}

wds_message!(
	GetCurrentDataBearerTechnology => CurrentDataBearerTechnologyOutput,
	"get-current-data-bearer-technology"
);

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GetSupportedMessages;

/// Bitmask of supported message IDs: bit `n` of byte `i` is set when message
/// `8 * i + n` is supported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportedMessagesOutput {
	pub list: Vec<u8>,
}

wds_message!(GetSupportedMessages => SupportedMessagesOutput, "get-supported-messages");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
	pub endpoint_type: EndpointType,
	pub interface_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindMuxDataPortInput {
	pub endpoint_info: EndpointInfo,
	pub mux_id: u32,
	pub client_type: ClientType,
}

wds_message!(BindMuxDataPortInput => IgnoredAny, "bind-mux-data-port");
