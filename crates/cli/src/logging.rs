use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Filter directive for a `-v` count.
///
/// 0 keeps request traffic quiet, 1 (-v) shows session state transitions,
/// 2+ (-vv) shows every request, response and lifecycle event.
pub fn default_filter(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "error",
		1 => "info",
		_ => "debug",
	}
}

/// Installs the stderr subscriber. `RUST_LOG` overrides the verbosity.
pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_ansi(std::io::stderr().is_terminal())
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verbosity_widens_filter() {
		assert_eq!(default_filter(0), "error");
		assert_eq!(default_filter(1), "info");
		assert_eq!(default_filter(2), "debug");
		assert_eq!(default_filter(9), "debug");
	}
}
