//! One-shot requests: one request, one deadline, typed output printed.

use std::time::Duration;

use wds_protocol::{
	AutoconnectSettings, BindMuxDataPortInput, CurrentDataBearerTechnologyOutput, CurrentSettings,
	DataBearer, DataBearerTechnologyOutput, GetAutoconnectSettings,
	GetCurrentDataBearerTechnology, GetCurrentSettingsInput, GetDataBearerTechnology,
	GetDormancyStatus, GetPacketServiceStatus, GetPacketStatistics, GetSupportedMessages,
	GoActive, GoDormant, PacketStatistics, ProtocolErrorCode, Reset, WdsMessage,
};
use wds_runtime::DeviceClient;

use crate::error::{Result, WdsError};
use crate::output::{LifecycleEvent, Reporter};

async fn request<M>(
	client: &dyn DeviceClient,
	input: &M,
	action: &'static str,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<M::Output>
where
	M: WdsMessage + Sync,
{
	reporter.lifecycle(LifecycleEvent::RequestSent { message: M::NAME });
	client
		.call(input, deadline)
		.await
		.map_err(|e| WdsError::from_runtime(action, e))
}

pub(super) async fn get_packet_service_status(
	client: &dyn DeviceClient,
	device: &str,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let output = request(
		client,
		&GetPacketServiceStatus,
		"get packet service status",
		deadline,
		reporter,
	)
	.await?;
	reporter.line(&format!(
		"[{device}] Connection status: '{}'",
		output.connection_status
	));
	Ok(())
}

pub(super) async fn get_packet_statistics(
	client: &dyn DeviceClient,
	device: &str,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let stats = request(
		client,
		&GetPacketStatistics,
		"get packet statistics",
		deadline,
		reporter,
	)
	.await?;

	reporter.line(&format!("[{device}] Connection statistics:"));
	for line in statistics_lines(&stats) {
		reporter.line(&line);
	}
	Ok(())
}

/// Counter lines. 32-bit counters equal to [`PacketStatistics::UNAVAILABLE`]
/// were not collected and are left out.
fn statistics_lines(stats: &PacketStatistics) -> Vec<String> {
	let counters = [
		("TX packets OK", stats.tx_packets_ok),
		("RX packets OK", stats.rx_packets_ok),
		("TX packets error", stats.tx_packets_error),
		("RX packets error", stats.rx_packets_error),
		("TX overflows", stats.tx_overflows),
		("RX overflows", stats.rx_overflows),
		("TX packets dropped", stats.tx_packets_dropped),
		("RX packets dropped", stats.rx_packets_dropped),
	];
	let bytes = [
		("TX bytes OK", stats.tx_bytes_ok),
		("RX bytes OK", stats.rx_bytes_ok),
		("TX bytes OK (last)", stats.last_call_tx_bytes_ok),
		("RX bytes OK (last)", stats.last_call_rx_bytes_ok),
	];

	let counters = counters
		.into_iter()
		.filter_map(|(label, value)| match value {
			Some(v) if v != PacketStatistics::UNAVAILABLE => Some(format!("\t{label}: {v}")),
			_ => None,
		});
	let bytes = bytes
		.into_iter()
		.filter_map(|(label, value)| value.map(|v| format!("\t{label}: {v}")));
	counters.chain(bytes).collect()
}

pub(super) async fn get_current_settings(
	client: &dyn DeviceClient,
	device: &str,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let settings = request(
		client,
		&GetCurrentSettingsInput::all(),
		"get current settings",
		deadline,
		reporter,
	)
	.await?;

	reporter.line(&format!("[{device}] Current settings retrieved:"));
	for line in current_settings_lines(&settings) {
		reporter.line(&line);
	}
	Ok(())
}

fn current_settings_lines(settings: &CurrentSettings) -> Vec<String> {
	let mut lines = Vec::new();
	let mut push = |label: &str, value: String| lines.push(format!("{label:>20}: {value}"));

	if let Some(family) = settings.ip_family {
		push("IP Family", family.to_string());
	}
	if let Some(addr) = settings.ipv4_address {
		push("IPv4 address", addr.to_string());
	}
	if let Some(addr) = settings.ipv4_subnet_mask {
		push("IPv4 subnet mask", addr.to_string());
	}
	if let Some(addr) = settings.ipv4_gateway_address {
		push("IPv4 gateway address", addr.to_string());
	}
	if let Some(addr) = settings.ipv4_primary_dns {
		push("IPv4 primary DNS", addr.to_string());
	}
	if let Some(addr) = settings.ipv4_secondary_dns {
		push("IPv4 secondary DNS", addr.to_string());
	}
	if let Some(prefixed) = settings.ipv6_address {
		push(
			"IPv6 address",
			format!("{}/{}", prefixed.address, prefixed.prefix_length),
		);
	}
	if let Some(prefixed) = settings.ipv6_gateway_address {
		push(
			"IPv6 gateway address",
			format!("{}/{}", prefixed.address, prefixed.prefix_length),
		);
	}
	if let Some(addr) = settings.ipv6_primary_dns {
		push("IPv6 primary DNS", addr.to_string());
	}
	if let Some(addr) = settings.ipv6_secondary_dns {
		push("IPv6 secondary DNS", addr.to_string());
	}
	if let Some(mtu) = settings.mtu {
		push("MTU", mtu.to_string());
	}
	if let Some(domains) = &settings.domain_name_list {
		let value = if domains.is_empty() {
			"none".to_string()
		} else {
			domains.join(", ")
		};
		push("Domains", value);
	}
	lines
}

pub(super) async fn get_dormancy_status(
	client: &dyn DeviceClient,
	device: &str,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let output = request(
		client,
		&GetDormancyStatus,
		"get dormancy status",
		deadline,
		reporter,
	)
	.await?;
	if let Some(status) = output.dormancy_status {
		reporter.line(&format!("[{device}] Dormancy Status: '{status}'"));
	}
	Ok(())
}

pub(super) async fn get_data_bearer_technology(
	client: &dyn DeviceClient,
	device: &str,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let result = request(
		client,
		&GetDataBearerTechnology,
		"get data bearer technology",
		deadline,
		reporter,
	)
	.await;

	match result {
		Ok(output) => {
			let current = output.current.as_deref().unwrap_or("unknown");
			reporter.line(&format!("[{device}] Data bearer technology (current): '{current}'"));
			Ok(())
		}
		Err(err) => {
			// Out of call, the device may still know the last bearer used.
			if err.protocol_code() == Some(ProtocolErrorCode::OutOfCall) {
				if let Some(last) = err.details::<DataBearerTechnologyOutput>().and_then(|o| o.last) {
					reporter.line(&format!("[{device}] Data bearer technology (last): '{last}'"));
				}
			}
			Err(err)
		}
	}
}

pub(super) async fn get_current_data_bearer_technology(
	client: &dyn DeviceClient,
	device: &str,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let result = request(
		client,
		&GetCurrentDataBearerTechnology,
		"get current data bearer technology",
		deadline,
		reporter,
	)
	.await;

	match result {
		Ok(output) => {
			if let Some(current) = &output.current {
				for line in bearer_lines(device, "current", current) {
					reporter.line(&line);
				}
			}
			Ok(())
		}
		Err(err) => {
			let last = err
				.details::<CurrentDataBearerTechnologyOutput>()
				.and_then(|o| o.last);
			if let Some(last) = &last {
				for line in bearer_lines(device, "last", last) {
					reporter.line(&line);
				}
			}
			Err(err)
		}
	}
}

fn bearer_lines(device: &str, which: &str, bearer: &DataBearer) -> Vec<String> {
	let names = |list: &[String]| {
		if list.is_empty() {
			"unknown".to_string()
		} else {
			list.join(", ")
		}
	};
	vec![
		format!("[{device}] Data bearer technology ({which}):"),
		format!("{:>26}: '{}'", "Network type", bearer.network_type),
		format!(
			"{:>26}: '{}'",
			"Radio Access Technology",
			names(&bearer.radio_access_technology)
		),
		format!("{:>26}: '{}'", "Service Option", names(&bearer.service_option)),
	]
}

pub(super) async fn get_supported_messages(
	client: &dyn DeviceClient,
	device: &str,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let output = request(
		client,
		&GetSupportedMessages,
		"get supported WDS messages",
		deadline,
		reporter,
	)
	.await?;

	reporter.line(&format!("[{device}] Successfully got supported WDS messages:"));
	for line in supported_message_lines(&output.list) {
		reporter.line(&line);
	}
	Ok(())
}

/// One `0xNNNN` line per bit set in the mask, lowest ID first.
fn supported_message_lines(mask: &[u8]) -> Vec<String> {
	let lines: Vec<String> = mask
		.iter()
		.enumerate()
		.flat_map(|(byte, bits)| {
			(0..8usize)
				.filter(move |bit| bits & (1u8 << bit) != 0)
				.map(move |bit| format!("\t0x{:04X}", byte * 8 + bit))
		})
		.collect();
	if lines.is_empty() {
		vec!["\tnone".to_string()]
	} else {
		lines
	}
}

pub(super) async fn go_dormant(
	client: &dyn DeviceClient,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	request(client, &GoDormant, "go dormant", deadline, reporter).await?;
	Ok(())
}

pub(super) async fn go_active(
	client: &dyn DeviceClient,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	request(client, &GoActive, "go active", deadline, reporter).await?;
	Ok(())
}

pub(super) async fn get_autoconnect_settings(
	client: &dyn DeviceClient,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let settings = request(
		client,
		&GetAutoconnectSettings,
		"get autoconnect settings",
		deadline,
		reporter,
	)
	.await?;

	reporter.line("Autoconnect settings retrieved:");
	reporter.line(&format!("\tStatus: '{}'", settings.status));
	if let Some(roaming) = settings.roaming {
		reporter.line(&format!("\tRoaming: '{roaming}'"));
	}
	Ok(())
}

pub(super) async fn set_autoconnect_settings(
	client: &dyn DeviceClient,
	settings: &AutoconnectSettings,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	request(
		client,
		settings,
		"set autoconnect settings",
		deadline,
		reporter,
	)
	.await?;
	reporter.line("Autoconnect settings updated");
	Ok(())
}

pub(super) async fn reset(
	client: &dyn DeviceClient,
	device: &str,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	request(client, &Reset, "reset the WDS service", deadline, reporter).await?;
	reporter.line(&format!("[{device}] Successfully performed WDS service reset"));
	Ok(())
}

pub(super) async fn bind_mux_data_port(
	client: &dyn DeviceClient,
	input: &BindMuxDataPortInput,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	request(client, input, "bind mux data port", deadline, reporter).await?;
	Ok(())
}
