use wds_protocol::{PacketDataHandle, StopNetworkInput};

use crate::properties::PropertyError;

const DISABLE_AUTOCONNECT: &str = "disable-autoconnect";

/// Parses a stop-network target.
///
/// Accepts a nonzero decimal or `0x`-prefixed hex handle that fits in 32 bits,
/// or `disable-autoconnect`, which stops whatever session is active through
/// the reserved handle and turns autoconnect off.
pub fn build_stop_network(input: &str) -> Result<StopNetworkInput, PropertyError> {
	let input = input.trim();
	if input == DISABLE_AUTOCONNECT {
		return Ok(StopNetworkInput {
			packet_data_handle: PacketDataHandle::IMPLICIT,
			disable_autoconnect: Some(true),
		});
	}

	let (digits, radix) = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
		Some(hex) => (hex, 16),
		None => (input, 10),
	};

	// from_str_radix tolerates a leading sign; a handle is digits only.
	let handle = Some(digits)
		.filter(|d| d.chars().all(|c| c.is_digit(radix)))
		.and_then(|d| u64::from_str_radix(d, radix).ok())
		.and_then(|n| u32::try_from(n).ok())
		.filter(|&n| n != 0)
		.ok_or_else(|| {
			PropertyError::invalid(
				"packet data handle",
				input,
				"a nonzero 32-bit integer or 'disable-autoconnect'",
			)
		})?;

	Ok(StopNetworkInput {
		packet_data_handle: PacketDataHandle(handle),
		disable_autoconnect: None,
	})
}
