//! Turning operator arguments into request inputs.
//!
//! Every builder validates its whole input before anything is sent to the
//! device; a [`PropertyError`] means no request was built.

mod bind_mux;
mod settings;
mod start_network;
mod stop_network;

pub use bind_mux::{BindMuxProperties, build_bind_mux};
pub use settings::{parse_autoconnect_settings, parse_profile_type};
pub use start_network::{StartNetworkProperties, build_start_network};
pub use stop_network::build_stop_network;

use crate::properties::PropertyError;

/// Parses a `u32` in decimal.
fn parse_u32(key: &str, value: &str) -> Result<u32, PropertyError> {
	value
		.parse::<u32>()
		.map_err(|_| PropertyError::invalid(key, value, "an unsigned 32-bit integer"))
}
