//! Request/response correlation on top of the transport.
//!
//! This module handles:
//! - Generating unique request IDs
//! - Correlating responses with pending requests
//! - Enforcing a per-request deadline
//! - Separating unsolicited indications from responses
//!
//! # Message Flow
//!
//! 1. Caller invokes `send_message()` with a message name, params and deadline
//! 2. Connection generates a unique ID and registers a oneshot channel
//! 3. Request is queued for the writer task
//! 4. Caller awaits the oneshot receiver (bounded by the deadline)
//! 5. The run loop receives the response from the transport
//! 6. Response is matched by ID and delivered through the oneshot channel
//!
//! A request future that is dropped early (deadline hit, caller cancelled)
//! removes its pending slot, so a late response is logged and discarded.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::client::DeviceClient;
use crate::error::{Error, Result};
use crate::transport::{Transport, TransportParts, TransportReceiver};

/// Request envelope sent to the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
	/// Unique request ID for correlating responses
	pub id: u32,
	/// Kebab-case message name
	pub message: String,
	/// Message input
	pub params: Value,
}

/// Response envelope from the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
	/// Request ID this response correlates to
	pub id: u32,
	/// Success result (mutually exclusive with error)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	/// Error result (mutually exclusive with result)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorPayload>,
}

/// Failure reported by the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
	/// Wire error code (e.g. "call-failed")
	pub code: String,
	/// Error message
	pub message: String,
	/// Message-specific failure fields
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Value>,
}

/// Unsolicited notification from the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indication {
	pub indication: String,
	#[serde(default)]
	pub params: Value,
}

/// Discriminated union of inbound messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
	/// Response message (has `id` field)
	Response(Response),
	/// Indication message (has `indication` field)
	Indication(Indication),
	/// Unknown message type (forward-compatible catch-all)
	Unknown(Value),
}

/// Pending request callbacks keyed by request ID.
type CallbackMap = Arc<Mutex<HashMap<u32, oneshot::Sender<Result<Value>>>>>;

/// RAII guard ensuring callback cleanup when a request future is dropped.
struct CancelGuard {
	id: u32,
	callbacks: CallbackMap,
	completed: bool,
}

impl CancelGuard {
	fn new(id: u32, callbacks: CallbackMap) -> Self {
		Self {
			id,
			callbacks,
			completed: false,
		}
	}

	fn complete(&mut self) {
		self.completed = true;
	}
}

impl Drop for CancelGuard {
	fn drop(&mut self) {
		if self.completed {
			return;
		}
		if self.callbacks.lock().remove(&self.id).is_some() {
			tracing::debug!(id = self.id, "CancelGuard: removed orphaned callback");
		}
	}
}

/// Future returned by [`Connection::send_message`] with automatic cancellation cleanup.
struct ResponseFuture {
	rx: oneshot::Receiver<Result<Value>>,
	guard: CancelGuard,
}

impl Future for ResponseFuture {
	type Output = Result<Value>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match Pin::new(&mut self.rx).poll(cx) {
			Poll::Ready(result) => {
				self.guard.complete();
				Poll::Ready(result.map_err(|_| Error::ChannelClosed).and_then(|r| r))
			}
			Poll::Pending => Poll::Pending,
		}
	}
}

/// Halves handed to the run loop, taken exactly once.
struct RunParts {
	sender: Box<dyn Transport>,
	receiver: Box<dyn TransportReceiver>,
	message_rx: mpsc::UnboundedReceiver<Value>,
	outbound_rx: mpsc::UnboundedReceiver<Value>,
}

/// Connection to one device.
///
/// Uses sequential request IDs and oneshot channels for correlation.
pub struct Connection {
	/// Sequential request ID counter
	last_id: AtomicU32,
	/// Pending request callbacks keyed by request ID
	callbacks: CallbackMap,
	/// Channel for sending outbound messages to the writer task
	outbound_tx: mpsc::UnboundedSender<Value>,
	/// Transport halves (taken by run())
	parts: Mutex<Option<RunParts>>,
}

impl Connection {
	/// Create a new Connection with the given transport
	pub fn new(parts: TransportParts) -> Self {
		let TransportParts {
			sender,
			receiver,
			message_rx,
		} = parts;

		let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

		Self {
			last_id: AtomicU32::new(0),
			callbacks: Arc::new(Mutex::new(HashMap::new())),
			outbound_tx,
			parts: Mutex::new(Some(RunParts {
				sender,
				receiver,
				message_rx,
				outbound_rx,
			})),
		}
	}

	/// Sends a request and awaits its response for at most `deadline`.
	pub async fn send_message(
		&self,
		message: &str,
		params: Value,
		deadline: Duration,
	) -> Result<Value> {
		let id = self.last_id.fetch_add(1, Ordering::SeqCst);

		tracing::debug!(id, message, "sending request");

		let (tx, rx) = oneshot::channel();
		self.callbacks.lock().insert(id, tx);

		let guard = CancelGuard::new(id, Arc::clone(&self.callbacks));

		let request = Request {
			id,
			message: message.to_string(),
			params,
		};

		let request_value = serde_json::to_value(&request)?;
		tracing::trace!("Request JSON: {}", request_value);

		if self.outbound_tx.send(request_value).is_err() {
			tracing::error!("Failed to queue message: outbound channel closed");
			return Err(Error::ChannelClosed);
		}

		match tokio::time::timeout(deadline, ResponseFuture { rx, guard }).await {
			Ok(result) => result,
			Err(_) => {
				tracing::debug!(id, message, ?deadline, "request deadline elapsed");
				Err(Error::Timeout(format!(
					"no response to '{message}' within {deadline:?}"
				)))
			}
		}
	}

	/// Number of requests still awaiting a response.
	pub fn pending_requests(&self) -> usize {
		self.callbacks.lock().len()
	}

	/// Run the message dispatch loop until the device closes the stream.
	///
	/// Pending requests fail with [`Error::ChannelClosed`] once the loop ends.
	pub async fn run(self: &Arc<Self>) -> Result<()> {
		let RunParts {
			mut sender,
			receiver,
			mut message_rx,
			mut outbound_rx,
		} = self
			.parts
			.lock()
			.take()
			.ok_or_else(|| Error::ProtocolError("connection is already running".to_string()))?;

		let reader_handle = tokio::spawn(async move {
			if let Err(e) = receiver.run().await {
				tracing::debug!("Transport read ended: {}", e);
			}
		});

		let writer_handle = tokio::spawn(async move {
			while let Some(message) = outbound_rx.recv().await {
				if let Err(e) = sender.send(message).await {
					tracing::error!("Transport write error: {}", e);
					break;
				}
			}
		});

		while let Some(message_value) = message_rx.recv().await {
			match serde_json::from_value::<Message>(message_value) {
				Ok(message) => {
					if let Err(e) = self.dispatch_internal(message) {
						tracing::warn!("Error dispatching message: {}", e);
					}
				}
				Err(e) => {
					tracing::error!("Failed to parse message: {}", e);
				}
			}
		}

		// Dropping the senders fails every pending request.
		self.callbacks.lock().clear();
		writer_handle.abort();
		let _ = reader_handle.await;
		Ok(())
	}

	/// Dispatch an incoming message (test-only public version)
	#[cfg(test)]
	pub fn dispatch(&self, message: Message) -> Result<()> {
		self.dispatch_internal(message)
	}

	fn dispatch_internal(&self, message: Message) -> Result<()> {
		match message {
			Message::Response(response) => {
				tracing::debug!(id = response.id, "received response");
				let callback = self.callbacks.lock().remove(&response.id).ok_or_else(|| {
					Error::ProtocolError(format!(
						"Cannot find request to respond: id={}",
						response.id
					))
				})?;

				let result = match response.error {
					Some(error) => Err(parse_protocol_error(error)),
					None => Ok(response.result.unwrap_or(Value::Null)),
				};

				let _ = callback.send(result);
				Ok(())
			}
			Message::Indication(indication) => {
				tracing::debug!(
					indication = %indication.indication,
					"indication received (ignored)"
				);
				Ok(())
			}
			Message::Unknown(value) => {
				tracing::debug!(
					"Unknown message type (forward-compatible, ignored): {}",
					serde_json::to_string(&value)
						.unwrap_or_else(|_| "<serialization failed>".to_string())
				);
				Ok(())
			}
		}
	}
}

/// Converts an [`ErrorPayload`] into [`Error::Device`].
fn parse_protocol_error(error: ErrorPayload) -> Error {
	Error::Device {
		code: error.code,
		message: error.message,
		details: error.details,
	}
}

impl DeviceClient for Connection {
	fn send_message(
		&self,
		message: &str,
		params: Value,
		deadline: Duration,
	) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>> {
		let message = message.to_string();
		Box::pin(async move { Connection::send_message(self, &message, params, deadline).await })
	}
}

#[cfg(test)]
mod tests;
