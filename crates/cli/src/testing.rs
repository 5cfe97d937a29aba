//! Scripted device and recording reporter for command tests.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use wds_runtime::{DeviceClient, Error, Result};

use crate::output::{LifecycleEvent, Reporter};

/// Everything a test can observe, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
	Request { message: String, params: Value },
	Line(String),
	Error(String),
	Lifecycle(LifecycleEvent),
	Complete(bool),
}

/// Shared, ordered log of requests and reporter output.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Entry>>>);

impl Journal {
	fn push(&self, entry: Entry) {
		self.0.lock().unwrap().push(entry);
	}

	pub fn entries(&self) -> Vec<Entry> {
		self.0.lock().unwrap().clone()
	}

	pub fn lines(&self) -> Vec<String> {
		self.entries()
			.into_iter()
			.filter_map(|e| match e {
				Entry::Line(text) => Some(text),
				_ => None,
			})
			.collect()
	}

	pub fn errors(&self) -> Vec<String> {
		self.entries()
			.into_iter()
			.filter_map(|e| match e {
				Entry::Error(text) => Some(text),
				_ => None,
			})
			.collect()
	}

	/// Message names of the requests that reached the device.
	pub fn requests(&self) -> Vec<String> {
		self.entries()
			.into_iter()
			.filter_map(|e| match e {
				Entry::Request { message, .. } => Some(message),
				_ => None,
			})
			.collect()
	}

	pub fn params_of(&self, message: &str) -> Vec<Value> {
		self.entries()
			.into_iter()
			.filter_map(|e| match e {
				Entry::Request { message: m, params } if m == message => Some(params),
				_ => None,
			})
			.collect()
	}

	pub fn count(&self, entry: &Entry) -> usize {
		self.entries().iter().filter(|e| *e == entry).count()
	}

	/// Index of the first matching entry.
	pub fn position(&self, entry: &Entry) -> Option<usize> {
		self.entries().iter().position(|e| e == entry)
	}

	pub fn request_position(&self, message: &str) -> Option<usize> {
		self.entries()
			.iter()
			.position(|e| matches!(e, Entry::Request { message: m, .. } if m == message))
	}

	pub fn completions(&self) -> Vec<bool> {
		self.entries()
			.into_iter()
			.filter_map(|e| match e {
				Entry::Complete(ok) => Some(ok),
				_ => None,
			})
			.collect()
	}
}

/// How the scripted device answers one request.
#[derive(Debug, Clone)]
pub enum Reply {
	Ok(Value),
	Device {
		code: &'static str,
		message: &'static str,
		details: Option<Value>,
	},
	/// Sleeps for the whole deadline, then times out.
	Timeout,
	/// Never answers.
	Hang,
	Closed,
}

impl Reply {
	pub fn device(code: &'static str, message: &'static str) -> Self {
		Reply::Device {
			code,
			message,
			details: None,
		}
	}
}

/// Device that answers each message name from a queue of scripted replies.
///
/// A request with nothing left in its queue fails with a protocol error.
pub struct MockDevice {
	replies: Mutex<HashMap<String, VecDeque<Reply>>>,
	journal: Journal,
}

impl MockDevice {
	pub fn new(journal: &Journal) -> Self {
		Self {
			replies: Mutex::new(HashMap::new()),
			journal: journal.clone(),
		}
	}

	pub fn reply(self, message: &str, reply: Reply) -> Self {
		self.replies
			.lock()
			.unwrap()
			.entry(message.to_string())
			.or_default()
			.push_back(reply);
		self
	}
}

impl DeviceClient for MockDevice {
	fn send_message(
		&self,
		message: &str,
		params: Value,
		deadline: Duration,
	) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>> {
		self.journal.push(Entry::Request {
			message: message.to_string(),
			params,
		});
		let reply = self
			.replies
			.lock()
			.unwrap()
			.get_mut(message)
			.and_then(VecDeque::pop_front);
		let message = message.to_string();

		Box::pin(async move {
			match reply {
				None => Err(Error::ProtocolError(format!("unscripted request: {message}"))),
				Some(Reply::Ok(value)) => Ok(value),
				Some(Reply::Device {
					code,
					message,
					details,
				}) => Err(Error::Device {
					code: code.to_string(),
					message: message.to_string(),
					details,
				}),
				Some(Reply::Timeout) => {
					tokio::time::sleep(deadline).await;
					Err(Error::Timeout(format!("{message} timed out after {deadline:?}")))
				}
				Some(Reply::Hang) => std::future::pending().await,
				Some(Reply::Closed) => Err(Error::ChannelClosed),
			}
		})
	}
}

/// Reporter writing into a [`Journal`].
pub struct RecordingReporter {
	journal: Journal,
}

impl RecordingReporter {
	pub fn new(journal: &Journal) -> Self {
		Self {
			journal: journal.clone(),
		}
	}
}

impl Reporter for RecordingReporter {
	fn line(&mut self, text: &str) {
		self.journal.push(Entry::Line(text.to_string()));
	}

	fn error(&mut self, text: &str) {
		self.journal.push(Entry::Error(text.to_string()));
	}

	fn complete(&mut self, success: bool) {
		self.journal.push(Entry::Complete(success));
	}

	fn lifecycle(&mut self, event: LifecycleEvent) {
		self.journal.push(Entry::Lifecycle(event));
	}
}
