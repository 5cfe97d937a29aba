//! Command execution.
//!
//! A command runs in three steps: its arguments are validated into an
//! [`Operation`] (nothing is sent if that fails), the device is opened, and
//! the operation runs against a [`DeviceClient`]. Whatever happens, the
//! reporter sees exactly one `complete`.
//!
//! Ctrl+C ends the device open and every operation except a followed
//! session with [`WdsError::Interrupted`]. A followed session observes it
//! itself and stops the network before finishing.

mod profiles;
mod query;


use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use wds_protocol::{
	AutoconnectSettings, BindMuxDataPortInput, ProfileType, StartNetworkInput, StopNetworkInput,
};
use wds_runtime::{Device, DeviceClient};

use crate::builder::{
	build_bind_mux, build_start_network, build_stop_network, parse_autoconnect_settings,
	parse_profile_type,
};
use crate::cli::{Cli, Commands};
use crate::config::RuntimeConfig;
use crate::error::{Result, WdsError};
use crate::output::{ConsoleReporter, Reporter};
use crate::session::SessionController;

/// A validated command, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
	StartNetwork {
		input: Option<StartNetworkInput>,
		follow: bool,
	},
	StopNetwork(StopNetworkInput),
	BindMuxDataPort(BindMuxDataPortInput),
	GetProfileList(ProfileType),
	GetDefaultSettings(ProfileType),
	GetPacketServiceStatus,
	GetPacketStatistics,
	GetCurrentSettings,
	GetDormancyStatus,
	GetDataBearerTechnology,
	GetCurrentDataBearerTechnology,
	GetSupportedMessages,
	GoDormant,
	GoActive,
	GetAutoconnectSettings,
	SetAutoconnectSettings(AutoconnectSettings),
	Reset,
	Noop,
}

impl Operation {
	/// Parses the command arguments. Fails on any malformed input.
	pub fn from_command(command: &Commands) -> Result<Self> {
		let operation = match command {
			Commands::StartNetwork(args) => Operation::StartNetwork {
				input: build_start_network(args.properties.as_deref().unwrap_or(""))?,
				follow: args.follow,
			},
			Commands::StopNetwork(args) => Operation::StopNetwork(build_stop_network(&args.handle)?),
			Commands::BindMuxDataPort(args) => {
				Operation::BindMuxDataPort(build_bind_mux(&args.properties)?)
			}
			Commands::GetProfileList(args) => {
				Operation::GetProfileList(parse_profile_type(&args.profile_type)?)
			}
			Commands::GetDefaultSettings(args) => {
				Operation::GetDefaultSettings(parse_profile_type(&args.profile_type)?)
			}
			Commands::GetPacketServiceStatus => Operation::GetPacketServiceStatus,
			Commands::GetPacketStatistics => Operation::GetPacketStatistics,
			Commands::GetCurrentSettings => Operation::GetCurrentSettings,
			Commands::GetDormancyStatus => Operation::GetDormancyStatus,
			Commands::GetDataBearerTechnology => Operation::GetDataBearerTechnology,
			Commands::GetCurrentDataBearerTechnology => Operation::GetCurrentDataBearerTechnology,
			Commands::GetSupportedMessages => Operation::GetSupportedMessages,
			Commands::GoDormant => Operation::GoDormant,
			Commands::GoActive => Operation::GoActive,
			Commands::GetAutoconnectSettings => Operation::GetAutoconnectSettings,
			Commands::SetAutoconnectSettings(args) => {
				Operation::SetAutoconnectSettings(parse_autoconnect_settings(&args.settings)?)
			}
			Commands::Reset => Operation::Reset,
			Commands::Noop => Operation::Noop,
		};
		Ok(operation)
	}

	/// Whether the operation reacts to Ctrl+C on its own.
	fn handles_interrupt(&self) -> bool {
		matches!(self, Operation::StartNetwork { follow: true, .. })
	}
}

/// Runs `work` until it finishes or `shutdown` fires, whichever is first.
async fn until_interrupted<T>(
	shutdown: &CancellationToken,
	work: impl Future<Output = Result<T>>,
) -> Result<T> {
	tokio::select! {
		biased;
		_ = shutdown.cancelled() => Err(WdsError::Interrupted),
		result = work => result,
	}
}

/// Runs the parsed command line. Returns whether the command succeeded.
///
/// Errors are only returned when the configuration itself is unusable, before
/// a reporter exists.
pub async fn dispatch(cli: &Cli, shutdown: &CancellationToken) -> Result<bool> {
	let config = RuntimeConfig::from_cli(cli)?;
	let mut reporter = ConsoleReporter::stdio(config.format, cli.command.name());

	let outcome = open_and_execute(&cli.command, &config, shutdown, &mut reporter).await;
	Ok(finish(outcome, &mut reporter))
}

async fn open_and_execute(
	command: &Commands,
	config: &RuntimeConfig,
	shutdown: &CancellationToken,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let operation = Operation::from_command(command)?;

	let open = async {
		Device::open(config.device.clone(), config.timeouts.query)
			.await
			.with_context(|| format!("couldn't open device '{}'", config.device))
			.map_err(WdsError::from)
	};
	let device = until_interrupted(shutdown, open).await?;
	let client = device.client();

	execute(&operation, client.as_ref(), config, shutdown, reporter).await
}

/// Reports a failed outcome and completes the command.
fn finish(outcome: Result<()>, reporter: &mut dyn Reporter) -> bool {
	let ok = match outcome {
		Ok(()) => true,
		Err(err) => {
			debug!(error = ?err, "command failed");
			for line in err.report_lines() {
				reporter.error(&line);
			}
			false
		}
	};
	reporter.complete(ok);
	ok
}

/// Runs one validated operation against an open device.
pub async fn execute(
	operation: &Operation,
	client: &dyn DeviceClient,
	config: &RuntimeConfig,
	shutdown: &CancellationToken,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	if operation.handles_interrupt() {
		return perform(operation, client, config, shutdown, reporter).await;
	}
	let work = perform(operation, client, config, shutdown, reporter);
	until_interrupted(shutdown, work).await
}

async fn perform(
	operation: &Operation,
	client: &dyn DeviceClient,
	config: &RuntimeConfig,
	shutdown: &CancellationToken,
	reporter: &mut dyn Reporter,
) -> Result<()> {
	let device = config.device_label();
	let timeouts = config.timeouts;

	match operation {
		Operation::StartNetwork { input, follow } => {
			let mut controller = SessionController::new(client, reporter, device, timeouts);
			let follow = follow.then_some(shutdown);
			controller.start(input.clone(), follow).await
		}
		Operation::StopNetwork(input) => {
			let mut controller = SessionController::new(client, reporter, device, timeouts);
			controller.stop(*input).await
		}
		Operation::BindMuxDataPort(input) => {
			query::bind_mux_data_port(client, input, timeouts.query, reporter).await
		}
		Operation::GetProfileList(profile_type) => {
			profiles::get_profile_list(client, *profile_type, &timeouts, reporter).await
		}
		Operation::GetDefaultSettings(profile_type) => {
			profiles::get_default_settings(client, *profile_type, timeouts.query, reporter).await
		}
		Operation::GetPacketServiceStatus => {
			query::get_packet_service_status(client, &device, timeouts.query, reporter).await
		}
		Operation::GetPacketStatistics => {
			query::get_packet_statistics(client, &device, timeouts.query, reporter).await
		}
		Operation::GetCurrentSettings => {
			query::get_current_settings(client, &device, timeouts.query, reporter).await
		}
		Operation::GetDormancyStatus => {
			query::get_dormancy_status(client, &device, timeouts.query, reporter).await
		}
		Operation::GetDataBearerTechnology => {
			query::get_data_bearer_technology(client, &device, timeouts.query, reporter).await
		}
		Operation::GetCurrentDataBearerTechnology => {
			query::get_current_data_bearer_technology(client, &device, timeouts.query, reporter).await
		}
		Operation::GetSupportedMessages => {
			query::get_supported_messages(client, &device, timeouts.query, reporter).await
		}
		Operation::GoDormant => query::go_dormant(client, timeouts.query, reporter).await,
		Operation::GoActive => query::go_active(client, timeouts.query, reporter).await,
		Operation::GetAutoconnectSettings => {
			query::get_autoconnect_settings(client, timeouts.query, reporter).await
		}
		Operation::SetAutoconnectSettings(settings) => {
			query::set_autoconnect_settings(client, settings, timeouts.query, reporter).await
		}
		Operation::Reset => query::reset(client, &device, timeouts.query, reporter).await,
		Operation::Noop => Ok(()),
	}
}
