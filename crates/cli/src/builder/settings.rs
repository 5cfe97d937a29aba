use wds_protocol::{AutoconnectRoaming, AutoconnectSetting, AutoconnectSettings, ProfileType};

use crate::properties::PropertyError;

pub fn parse_profile_type(input: &str) -> Result<ProfileType, PropertyError> {
	match input.trim() {
		"3gpp" => Ok(ProfileType::ThreeGpp),
		"3gpp2" => Ok(ProfileType::ThreeGpp2),
		other => Err(PropertyError::invalid("profile type", other, "3gpp or 3gpp2")),
	}
}

/// Parses `(enabled|disabled|paused)[,(roaming-allowed|home-only)]`.
pub fn parse_autoconnect_settings(input: &str) -> Result<AutoconnectSettings, PropertyError> {
	let fields: Vec<&str> = input.split(',').map(str::trim).collect();
	if fields.len() > 2 {
		return Err(PropertyError::Malformed(format!(
			"expected SETTING[,ROAMING], got {} fields",
			fields.len()
		)));
	}

	let status = match fields[0].to_ascii_lowercase().as_str() {
		"disabled" => AutoconnectSetting::Disabled,
		"enabled" => AutoconnectSetting::Enabled,
		"paused" => AutoconnectSetting::Paused,
		_ => {
			return Err(PropertyError::invalid(
				"autoconnect setting",
				fields[0],
				"enabled, disabled or paused",
			));
		}
	};

	let roaming = match fields.get(1) {
		None => None,
		Some(field) => Some(match field.to_ascii_lowercase().as_str() {
			"roaming-allowed" => AutoconnectRoaming::Allowed,
			"home-only" => AutoconnectRoaming::HomeOnly,
			_ => {
				return Err(PropertyError::invalid(
					"autoconnect roaming",
					field,
					"roaming-allowed or home-only",
				));
			}
		}),
	};

	Ok(AutoconnectSettings { status, roaming })
}
