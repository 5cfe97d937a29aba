//! Resolved runtime configuration.
//!
//! There is no configuration file. Everything comes from the command line
//! plus fixed protocol deadlines.

use std::time::Duration;

use wds_runtime::DeviceAddress;

use crate::cli::Cli;
use crate::error::{Result, WdsError};
use crate::output::OutputFormat;

/// Request deadlines and the follow-mode poll period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
	pub start: Duration,
	pub stop: Duration,
	pub poll_interval: Duration,
	pub poll_request: Duration,
	pub profile_settings: Duration,
	pub query: Duration,
}

impl Default for Timeouts {
	fn default() -> Self {
		Self {
			start: Duration::from_secs(45),
			stop: Duration::from_secs(10),
			poll_interval: Duration::from_secs(20),
			poll_request: Duration::from_secs(10),
			profile_settings: Duration::from_secs(3),
			query: Duration::from_secs(10),
		}
	}
}

/// Configuration for one CLI invocation.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
	pub device: DeviceAddress,
	pub format: OutputFormat,
	pub timeouts: Timeouts,
}

impl RuntimeConfig {
	pub fn from_cli(cli: &Cli) -> Result<Self> {
		let device = cli
			.device
			.parse::<DeviceAddress>()
			.map_err(|e| WdsError::InvalidInput(format!("invalid --device: {e}")))?;

		Ok(Self {
			device,
			format: cli.format,
			timeouts: Timeouts::default(),
		})
	}

	/// Device label used as the `[...]` prefix of session lines.
	pub fn device_label(&self) -> String {
		self.device.to_string()
	}
}
