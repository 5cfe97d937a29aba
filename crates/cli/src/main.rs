use clap::Parser;
use tokio_util::sync::CancellationToken;
use wds_cli::{
	cli::Cli,
	commands,
	error::WdsError,
	logging,
	output::{self, OutputFormat, ResultBuilder},
};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let shutdown = CancellationToken::new();
	let interrupt = shutdown.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_err() {
			return;
		}
		tracing::info!("interrupt received");
		interrupt.cancel();

		// A second Ctrl+C skips whatever teardown is still running.
		if tokio::signal::ctrl_c().await.is_ok() {
			tracing::warn!("second interrupt received, exiting");
			std::process::exit(130);
		}
	});

	match commands::dispatch(&cli, &shutdown).await {
		Ok(true) => {}
		Ok(false) => std::process::exit(1),
		Err(err) => {
			handle_error(&err, cli.command.name(), cli.format);
			std::process::exit(1);
		}
	}
}

fn handle_error(err: &WdsError, command: &str, format: OutputFormat) {
	let cmd_error = err.to_command_error();

	for line in err.report_lines() {
		eprintln!("error: {line}");
	}

	if format != OutputFormat::Text {
		let result = ResultBuilder::new(command).error(cmd_error).build(false);
		output::print_result(&result, format);
	}
}
