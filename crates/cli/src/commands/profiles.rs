use std::time::Duration;

use async_trait::async_trait;
use wds_protocol::{
	GetDefaultSettingsInput, GetProfileListInput, GetProfileSettingsInput, ProfileDescriptor,
	ProfileSettings, ProfileType, WdsMessage,
};
use wds_runtime::DeviceClient;

use crate::config::Timeouts;
use crate::enumerate::{ListWalk, walk};
use crate::error::{Result, WdsError};
use crate::output::{LifecycleEvent, Reporter};

/// Fetches the stored settings of each listed profile.
struct ProfileSettingsWalk<'a> {
	client: &'a dyn DeviceClient,
	deadline: Duration,
}

#[async_trait]
impl<'a> ListWalk for ProfileSettingsWalk<'a> {
	type Item = ProfileDescriptor;
	type Detail = ProfileSettings;

	const REQUEST: &'static str = GetProfileSettingsInput::NAME;
	const EMPTY: &'static str = "Profile list empty";
	const HEADER: &'static str = "Profile list retrieved:";

	fn summary(&self, profile: &ProfileDescriptor) -> String {
		format!(
			"\t[{}] {} - {}",
			profile.profile_index, profile.profile_type, profile.profile_name
		)
	}

	async fn fetch(&self, profile: &ProfileDescriptor) -> Result<ProfileSettings> {
		let input = GetProfileSettingsInput {
			profile_id: profile.id(),
		};
		self.client
			.call(&input, self.deadline)
			.await
			.map_err(|e| WdsError::from_runtime("get profile settings", e))
	}

	fn detail_lines(&self, settings: &ProfileSettings) -> Vec<String> {
		settings_lines(settings, "\t\t")
	}
}

/// Present fields of a profile, one per line.
fn settings_lines(settings: &ProfileSettings, indent: &str) -> Vec<String> {
	let mut lines = Vec::new();
	if let Some(apn) = &settings.apn_name {
		lines.push(format!("{indent}APN: '{apn}'"));
	}
	if let Some(pdp_type) = settings.pdp_type {
		lines.push(format!("{indent}PDP type: '{pdp_type}'"));
	}
	if let Some(username) = &settings.username {
		lines.push(format!("{indent}Username: '{username}'"));
	}
	if let Some(password) = &settings.password {
		lines.push(format!("{indent}Password: '{password}'"));
	}
	if let Some(auth) = settings.authentication {
		lines.push(format!("{indent}Auth: '{auth}'"));
	}
	lines
}

pub(super) async fn get_profile_list(
	client: &dyn DeviceClient,
	profile_type: ProfileType,
	timeouts: &Timeouts,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let input = GetProfileListInput { profile_type };
	reporter.lifecycle(LifecycleEvent::RequestSent {
		message: GetProfileListInput::NAME,
	});
	let output = client
		.call(&input, timeouts.query)
		.await
		.map_err(|e| WdsError::from_runtime("get profile list", e))?;

	let walker = ProfileSettingsWalk {
		client,
		deadline: timeouts.profile_settings,
	};
	let summary = walk(&walker, &output.profile_list, reporter).await;
	tracing::debug!(total = summary.total, failed = summary.failed, "profile walk finished");
	Ok(())
}

pub(super) async fn get_default_settings(
	client: &dyn DeviceClient,
	profile_type: ProfileType,
	deadline: Duration,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let input = GetDefaultSettingsInput { profile_type };
	reporter.lifecycle(LifecycleEvent::RequestSent {
		message: GetDefaultSettingsInput::NAME,
	});
	let settings = client
		.call(&input, deadline)
		.await
		.map_err(|e| WdsError::from_runtime("get default settings", e))?;

	reporter.line("Default settings retrieved:");
	for line in settings_lines(&settings, "\t") {
		reporter.line(&line);
	}
	Ok(())
}
