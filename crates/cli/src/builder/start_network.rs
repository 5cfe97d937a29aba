use wds_protocol::{Authentication, IpFamily, StartNetworkInput};

use crate::properties::{PropertyError, PropertyHandler, parse_key_value_string, set_once};

/// Fields an operator may supply for start-network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartNetworkProperties {
	pub apn: Option<String>,
	pub profile_index_3gpp: Option<u8>,
	pub profile_index_3gpp2: Option<u8>,
	pub auth: Option<Authentication>,
	pub username: Option<String>,
	pub password: Option<String>,
	pub autoconnect: Option<bool>,
	pub ip_family: Option<IpFamily>,
}

impl PropertyHandler for StartNetworkProperties {
	fn set_property(&mut self, key: &str, value: &str) -> Result<(), PropertyError> {
		match key {
			"apn" => set_once(&mut self.apn, key, value.to_string()),
			"3gpp-profile" => set_once(&mut self.profile_index_3gpp, key, parse_profile_index(key, value)?),
			"3gpp2-profile" => set_once(&mut self.profile_index_3gpp2, key, parse_profile_index(key, value)?),
			"auth" => set_once(&mut self.auth, key, parse_auth(value)?),
			"username" => set_once(&mut self.username, key, value.to_string()),
			"password" => set_once(&mut self.password, key, value.to_string()),
			"autoconnect" => set_once(&mut self.autoconnect, key, parse_yes_no(key, value)?),
			"ip-type" => set_once(&mut self.ip_family, key, parse_ip_type(value)?),
			_ => Err(PropertyError::Unrecognized {
				key: key.to_string(),
			}),
		}
	}
}

impl From<StartNetworkProperties> for StartNetworkInput {
	fn from(props: StartNetworkProperties) -> Self {
		StartNetworkInput {
			apn: props.apn,
			profile_index_3gpp: props.profile_index_3gpp,
			profile_index_3gpp2: props.profile_index_3gpp2,
			authentication_preference: props.auth,
			username: props.username.filter(|s| !s.is_empty()),
			password: props.password.filter(|s| !s.is_empty()),
			ip_family_preference: props.ip_family,
			enable_autoconnect: props.autoconnect,
		}
	}
}

/// Builds start-network parameters.
///
/// Returns `None` for an empty string, meaning the device defaults apply.
/// Input containing `=` is read as `key=value` pairs; anything else uses the
/// positional `apn,auth,username,password` layout.
pub fn build_start_network(input: &str) -> Result<Option<StartNetworkInput>, PropertyError> {
	let input = input.trim();
	if input.is_empty() {
		return Ok(None);
	}

	let props = if input.contains('=') {
		let mut props = StartNetworkProperties::default();
		parse_key_value_string(input, &mut props)?;
		props
	} else {
		parse_positional(input)?
	};

	tracing::debug!(?props, "start-network properties");
	Ok(Some(props.into()))
}

fn parse_positional(input: &str) -> Result<StartNetworkProperties, PropertyError> {
	let fields: Vec<&str> = input.split(',').map(str::trim).collect();
	if fields.len() > 4 {
		return Err(PropertyError::Malformed(format!(
			"expected at most 4 fields (apn,auth,username,password), got {}",
			fields.len()
		)));
	}

	let mut props = StartNetworkProperties {
		apn: non_empty(fields[0]),
		..Default::default()
	};

	if let Some(auth) = fields.get(1).copied().and_then(non_empty) {
		props.auth = Some(parse_auth(&auth)?);
		props.username = fields.get(2).copied().and_then(non_empty);
		props.password = fields.get(3).copied().and_then(non_empty);
	}

	Ok(props)
}

fn non_empty(s: &str) -> Option<String> {
	(!s.is_empty()).then(|| s.to_string())
}

fn parse_auth(value: &str) -> Result<Authentication, PropertyError> {
	match value.to_ascii_lowercase().as_str() {
		"none" => Ok(Authentication::None),
		"pap" => Ok(Authentication::Pap),
		"chap" => Ok(Authentication::Chap),
		"both" => Ok(Authentication::Both),
		_ => Err(PropertyError::invalid("auth", value, "none, pap, chap or both")),
	}
}

fn parse_profile_index(key: &str, value: &str) -> Result<u8, PropertyError> {
	match value.parse::<u8>() {
		Ok(index) if index >= 1 => Ok(index),
		_ => Err(PropertyError::invalid(key, value, "a profile index between 1 and 255")),
	}
}

fn parse_yes_no(key: &str, value: &str) -> Result<bool, PropertyError> {
	match value.to_ascii_lowercase().as_str() {
		"yes" | "true" => Ok(true),
		"no" | "false" => Ok(false),
		_ => Err(PropertyError::invalid(key, value, "yes or no")),
	}
}

fn parse_ip_type(value: &str) -> Result<IpFamily, PropertyError> {
	match value {
		"4" => Ok(IpFamily::Ipv4),
		"6" => Ok(IpFamily::Ipv6),
		_ => Err(PropertyError::invalid("ip-type", value, "4 or 6")),
	}
}
