//! Operator-facing output.
//!
//! Commands never print directly. They talk to a [`Reporter`], which decides
//! how lines, errors and the final outcome are rendered.
//!
//! ## Output Contract
//!
//! In `json` format every command produces one envelope on stdout when it
//! completes:
//!
//! ```json
//! {
//!   "ok": true,
//!   "command": "start-network",
//!   "lines": ["[/dev/cdc-wdm0] Network started", "\tPacket data handle: '16'"],
//!   "timings": { "durationMs": 812 }
//! }
//! ```
//!
//! On failure `ok` is false and the reported errors are listed:
//!
//! ```json
//! {
//!   "ok": false,
//!   "command": "start-network",
//!   "errors": ["couldn't start network: Call failed", "call end reason (1): generic-unspecified"]
//! }
//! ```
//!
//! `ndjson` emits one object per event as it happens; `text` (the default)
//! writes lines to stdout and errors to stderr.


use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Output format for CLI results.
///
/// Used both for clap argument parsing and internal formatting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text
	#[default]
	Text,
	/// One JSON envelope on completion
	Json,
	/// Newline-delimited JSON (streaming)
	Ndjson,
}

impl std::str::FromStr for OutputFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"text" => Ok(OutputFormat::Text),
			"json" => Ok(OutputFormat::Json),
			"ndjson" => Ok(OutputFormat::Ndjson),
			_ => Err(format!("unknown format: {s}")),
		}
	}
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Text => write!(f, "text"),
			OutputFormat::Json => write!(f, "json"),
			OutputFormat::Ndjson => write!(f, "ndjson"),
		}
	}
}

/// Resource and request milestones a command passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum LifecycleEvent {
	PollArmed,
	PollDisarmed,
	CancellationRegistered,
	CancellationUnregistered,
	RequestSent { message: &'static str },
}

/// Sink for everything a command wants the operator to see.
pub trait Reporter: Send {
	/// Informational output line.
	fn line(&mut self, text: &str);

	/// Error line (rendered with an `error:` prefix in text mode).
	fn error(&mut self, text: &str);

	/// Final outcome. Called exactly once per command, after every held
	/// resource has been released.
	fn complete(&mut self, success: bool);

	/// Resource milestone, for tracing and tests.
	fn lifecycle(&mut self, _event: LifecycleEvent) {}
}

/// The main result envelope emitted in `json` format.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
	/// Whether the command succeeded
	pub ok: bool,

	/// Command name (e.g., "start-network", "get-profile-list")
	pub command: String,

	/// Informational lines in the order they were reported
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub lines: Vec<String>,

	/// Error lines in the order they were reported
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub errors: Vec<String>,

	/// Classified failure for programmatic handling
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,

	/// Timing information
	#[serde(skip_serializing_if = "Option::is_none")]
	pub timings: Option<Timings>,
}

/// Error information for failed commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	/// Error code (e.g., "DEVICE_ERROR", "TIMEOUT")
	pub code: ErrorCode,

	/// Human-readable error message
	pub message: String,

	/// Additional error details (protocol code, failure fields)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Standardized error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Malformed operator input; nothing was sent
	InvalidInput,
	/// Device endpoint could not be opened
	ConnectionFailed,
	/// No response within the request deadline
	Timeout,
	/// Framing or connection failure mid-request
	TransportError,
	/// The device answered with a failure
	DeviceError,
	/// Interrupted by the operator before an answer arrived
	Cancelled,
	/// Unknown/internal error
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::ConnectionFailed => "CONNECTION_FAILED",
			ErrorCode::Timeout => "TIMEOUT",
			ErrorCode::TransportError => "TRANSPORT_ERROR",
			ErrorCode::DeviceError => "DEVICE_ERROR",
			ErrorCode::Cancelled => "CANCELLED",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		};
		write!(f, "{s}")
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	pub duration_ms: u64,
}

impl From<Duration> for Timings {
	fn from(duration: Duration) -> Self {
		Self {
			duration_ms: duration.as_millis() as u64,
		}
	}
}

/// Builder for constructing command results
pub struct ResultBuilder {
	command: String,
	lines: Vec<String>,
	errors: Vec<String>,
	error: Option<CommandError>,
	start_time: Instant,
}

impl ResultBuilder {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			lines: Vec::new(),
			errors: Vec::new(),
			error: None,
			start_time: Instant::now(),
		}
	}

	pub fn line(mut self, text: impl Into<String>) -> Self {
		self.lines.push(text.into());
		self
	}

	pub fn error_line(mut self, text: impl Into<String>) -> Self {
		self.errors.push(text.into());
		self
	}

	/// Attach a classified error; the result will not be ok.
	pub fn error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn build(self, ok: bool) -> CommandResult {
		CommandResult {
			ok: ok && self.error.is_none(),
			command: self.command,
			lines: self.lines,
			errors: self.errors,
			error: self.error,
			timings: Some(self.start_time.elapsed().into()),
		}
	}
}

/// Print a result envelope to stdout.
pub fn print_result(result: &CommandResult, format: OutputFormat) {
	let rendered = match format {
		OutputFormat::Ndjson => serde_json::to_string(result),
		_ => serde_json::to_string_pretty(result),
	};
	match rendered {
		Ok(s) => println!("{s}"),
		Err(e) => eprintln!("{} failed to serialize result: {e}", "error:".red().bold()),
	}
}

/// Reporter writing to the process streams in the selected format.
pub struct ConsoleReporter {
	format: OutputFormat,
	out: Box<dyn Write + Send>,
	err: Box<dyn Write + Send>,
	color: bool,
	builder: Option<ResultBuilder>,
	completed: bool,
}

impl ConsoleReporter {
	/// Reporter on stdout/stderr. Colors are used only on a terminal.
	pub fn stdio(format: OutputFormat, command: &str) -> Self {
		let color = io::stderr().is_terminal();
		let mut reporter = Self::with_writers(format, command, Box::new(io::stdout()), Box::new(io::stderr()));
		reporter.color = color;
		reporter
	}

	/// Reporter on arbitrary writers, without colors.
	pub fn with_writers(
		format: OutputFormat,
		command: &str,
		out: Box<dyn Write + Send>,
		err: Box<dyn Write + Send>,
	) -> Self {
		Self {
			format,
			out,
			err,
			color: false,
			builder: Some(ResultBuilder::new(command)),
			completed: false,
		}
	}

	fn emit_ndjson(&mut self, value: serde_json::Value) {
		let _ = writeln!(self.out, "{value}");
		let _ = self.out.flush();
	}

	fn error_prefix(&self) -> String {
		if self.color {
			"error:".red().bold().to_string()
		} else {
			"error:".to_string()
		}
	}
}

impl Reporter for ConsoleReporter {
	fn line(&mut self, text: &str) {
		match self.format {
			OutputFormat::Text => {
				let _ = writeln!(self.out, "{text}");
			}
			OutputFormat::Json => {
				self.builder = self.builder.take().map(|b| b.line(text));
			}
			OutputFormat::Ndjson => {
				self.emit_ndjson(serde_json::json!({ "type": "line", "text": text }));
			}
		}
	}

	fn error(&mut self, text: &str) {
		match self.format {
			OutputFormat::Text => {
				let prefix = self.error_prefix();
				let _ = writeln!(self.err, "{prefix} {text}");
			}
			OutputFormat::Json => {
				self.builder = self.builder.take().map(|b| b.error_line(text));
			}
			OutputFormat::Ndjson => {
				self.emit_ndjson(serde_json::json!({ "type": "error", "text": text }));
			}
		}
	}

	fn complete(&mut self, success: bool) {
		if self.completed {
			tracing::warn!("command completed twice; ignoring second outcome");
			return;
		}
		self.completed = true;

		let Some(builder) = self.builder.take() else {
			return;
		};
		let result = builder.build(success);
		match self.format {
			OutputFormat::Text => {}
			OutputFormat::Json => match serde_json::to_string_pretty(&result) {
				Ok(s) => {
					let _ = writeln!(self.out, "{s}");
				}
				Err(e) => tracing::error!("failed to serialize result: {e}"),
			},
			OutputFormat::Ndjson => {
				self.emit_ndjson(serde_json::json!({
					"type": "complete",
					"ok": result.ok,
					"command": result.command,
					"timings": result.timings,
				}));
			}
		}
		let _ = self.out.flush();
		let _ = self.err.flush();
	}

	fn lifecycle(&mut self, event: LifecycleEvent) {
		tracing::debug!(?event, "lifecycle");
		if self.format == OutputFormat::Ndjson {
			if let Ok(mut value) = serde_json::to_value(event) {
				value["type"] = serde_json::Value::from("lifecycle");
				self.emit_ndjson(value);
			}
		}
	}
}
