use wds_protocol::{BindMuxDataPortInput, ClientType, EndpointInfo, EndpointType};

use super::parse_u32;
use crate::properties::{PropertyError, PropertyHandler, parse_key_value_string, set_once};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindMuxProperties {
	pub mux_id: Option<u32>,
	pub ep_iface_number: Option<u32>,
}

impl PropertyHandler for BindMuxProperties {
	fn set_property(&mut self, key: &str, value: &str) -> Result<(), PropertyError> {
		match key {
			"mux-id" => set_once(&mut self.mux_id, key, parse_u32(key, value)?),
			"ep-iface-number" => set_once(&mut self.ep_iface_number, key, parse_u32(key, value)?),
			_ => Err(PropertyError::Unrecognized {
				key: key.to_string(),
			}),
		}
	}
}

/// Builds bind-mux-data-port parameters from `mux-id=N,ep-iface-number=M`.
///
/// The endpoint is always a high-speed USB data endpoint and the client is
/// always tethered.
pub fn build_bind_mux(input: &str) -> Result<BindMuxDataPortInput, PropertyError> {
	if !input.contains('=') {
		return Err(PropertyError::Malformed(
			"expected mux-id=N,ep-iface-number=M".to_string(),
		));
	}

	let mut props = BindMuxProperties::default();
	parse_key_value_string(input, &mut props)?;

	let mux_id = props.mux_id.ok_or(PropertyError::Missing { key: "mux-id" })?;
	let interface_number = props
		.ep_iface_number
		.ok_or(PropertyError::Missing {
			key: "ep-iface-number",
		})?;

	Ok(BindMuxDataPortInput {
		endpoint_info: EndpointInfo {
			endpoint_type: EndpointType::Hsusb,
			interface_number,
		},
		mux_id,
		client_type: ClientType::Tethered,
	})
}
