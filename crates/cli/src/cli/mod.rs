
use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use crate::styles::cli_styles;

/// Root CLI for wdscli.
#[derive(Parser, Debug)]
#[command(name = "wdscli")]
#[command(about = "Wireless Data Service control - start, follow and stop mobile data sessions")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: text (default), json, or ndjson
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	/// Device service endpoint: a unix socket path, or tcp:HOST:PORT
	#[arg(short = 'd', long, value_name = "PATH")]
	pub device: String,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Start a data session.
	StartNetwork(StartNetworkArgs),
	/// Stop a data session by packet data handle.
	StopNetwork(StopNetworkArgs),
	/// Bind the client to a mux data port.
	BindMuxDataPort(BindMuxArgs),
	/// List stored profiles with their settings.
	GetProfileList(ProfileTypeArgs),
	/// Show the default profile settings.
	GetDefaultSettings(ProfileTypeArgs),
	/// Show the packet service connection status.
	GetPacketServiceStatus,
	/// Show packet counters.
	GetPacketStatistics,
	/// Show the current IP settings.
	GetCurrentSettings,
	/// Show the dormancy status.
	GetDormancyStatus,
	/// Show the data bearer technology.
	GetDataBearerTechnology,
	/// Show the current data bearer technology with its radio access details.
	GetCurrentDataBearerTechnology,
	/// List the WDS message IDs the device supports.
	GetSupportedMessages,
	/// Make the active connection dormant.
	GoDormant,
	/// Make the active connection active.
	GoActive,
	/// Show autoconnect settings.
	GetAutoconnectSettings,
	/// Change autoconnect settings.
	SetAutoconnectSettings(SetAutoconnectArgs),
	/// Reset the WDS service state.
	Reset,
	/// Open the device and do nothing.
	Noop,
}

impl Commands {
	/// Subcommand name as typed on the command line.
	pub fn name(&self) -> &'static str {
		match self {
			Commands::StartNetwork(_) => "start-network",
			Commands::StopNetwork(_) => "stop-network",
			Commands::BindMuxDataPort(_) => "bind-mux-data-port",
			Commands::GetProfileList(_) => "get-profile-list",
			Commands::GetDefaultSettings(_) => "get-default-settings",
			Commands::GetPacketServiceStatus => "get-packet-service-status",
			Commands::GetPacketStatistics => "get-packet-statistics",
			Commands::GetCurrentSettings => "get-current-settings",
			Commands::GetDormancyStatus => "get-dormancy-status",
			Commands::GetDataBearerTechnology => "get-data-bearer-technology",
			Commands::GetCurrentDataBearerTechnology => "get-current-data-bearer-technology",
			Commands::GetSupportedMessages => "get-supported-messages",
			Commands::GoDormant => "go-dormant",
			Commands::GoActive => "go-active",
			Commands::GetAutoconnectSettings => "get-autoconnect-settings",
			Commands::SetAutoconnectSettings(_) => "set-autoconnect-settings",
			Commands::Reset => "reset",
			Commands::Noop => "noop",
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct StartNetworkArgs {
	/// Either key=value pairs (apn, 3gpp-profile, 3gpp2-profile, auth,
	/// username, password, autoconnect, ip-type) or the positional form
	/// APN[,AUTH[,USERNAME[,PASSWORD]]]. Empty uses device defaults.
	#[arg(value_name = "PROPS")]
	pub properties: Option<String>,

	/// Keep the session open, poll its status and stop it on Ctrl+C or
	/// disconnection.
	#[arg(long)]
	pub follow: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StopNetworkArgs {
	/// Packet data handle (decimal or 0x hex), or 'disable-autoconnect'.
	#[arg(value_name = "HANDLE")]
	pub handle: String,
}

#[derive(Args, Debug, Clone)]
pub struct BindMuxArgs {
	/// mux-id=N,ep-iface-number=M
	#[arg(value_name = "PROPS")]
	pub properties: String,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileTypeArgs {
	/// Profile family: 3gpp or 3gpp2
	#[arg(value_name = "TYPE")]
	pub profile_type: String,
}

#[derive(Args, Debug, Clone)]
pub struct SetAutoconnectArgs {
	/// (enabled|disabled|paused)[,(roaming-allowed|home-only)]
	#[arg(value_name = "SETTINGS")]
	pub settings: String,
}
