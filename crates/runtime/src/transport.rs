//! Length-prefixed JSON framing over a byte stream.
//!
//! Every frame is a 4-byte little-endian length followed by that many bytes
//! of UTF-8 JSON. The transport owns both halves of the stream: the writer
//! half sends frames, the reader half decodes frames into [`Value`]s and
//! forwards them over an unbounded channel.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// Frames larger than this are rejected as corrupt.
pub const MAX_FRAME_LEN: usize = 32 * 1024 * 1024;

/// Sending half of a transport.
pub trait Transport: Send {
	fn send(&mut self, message: Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Receiving half of a transport. Runs until the stream ends or the
/// consumer goes away.
pub trait TransportReceiver: Send {
	fn run(self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;
}

/// Both transport halves plus the channel decoded frames arrive on.
pub struct TransportParts {
	pub sender: Box<dyn Transport>,
	pub receiver: Box<dyn TransportReceiver>,
	pub message_rx: mpsc::UnboundedReceiver<Value>,
}

/// Transport over any async reader/writer pair (socket halves, pipes).
pub struct PipeTransport<W, R> {
	writer: W,
	reader: R,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl<W, R> PipeTransport<W, R>
where
	W: AsyncWrite + Unpin + Send + 'static,
	R: AsyncRead + Unpin + Send + 'static,
{
	/// Creates a transport and the receiver decoded frames are delivered to.
	pub fn new(writer: W, reader: R) -> (Self, mpsc::UnboundedReceiver<Value>) {
		let (message_tx, message_rx) = mpsc::unbounded_channel();
		(
			Self {
				writer,
				reader,
				message_tx,
			},
			message_rx,
		)
	}

	/// Writes one frame.
	pub async fn send(&mut self, message: Value) -> Result<()> {
		write_frame(&mut self.writer, &message).await
	}

	/// Reads frames until EOF or until the message receiver is dropped.
	pub async fn run(&mut self) -> Result<()> {
		read_loop(&mut self.reader, &self.message_tx).await
	}

	/// Splits into independently owned sender and receiver halves.
	pub fn into_parts(self) -> (PipeTransportSender<W>, PipeTransportReceiver<R>) {
		(
			PipeTransportSender {
				writer: self.writer,
			},
			PipeTransportReceiver {
				reader: self.reader,
				message_tx: self.message_tx,
			},
		)
	}

	/// Splits into boxed halves ready for a [`Connection`](crate::Connection).
	pub fn into_transport_parts(self, message_rx: mpsc::UnboundedReceiver<Value>) -> TransportParts {
		let (sender, receiver) = self.into_parts();
		TransportParts {
			sender: Box::new(sender),
			receiver: Box::new(receiver),
			message_rx,
		}
	}
}

pub struct PipeTransportSender<W> {
	writer: W,
}

impl<W> Transport for PipeTransportSender<W>
where
	W: AsyncWrite + Unpin + Send,
{
	fn send(&mut self, message: Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
		Box::pin(async move { write_frame(&mut self.writer, &message).await })
	}
}

pub struct PipeTransportReceiver<R> {
	reader: R,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl<R> TransportReceiver for PipeTransportReceiver<R>
where
	R: AsyncRead + Unpin + Send + 'static,
{
	fn run(self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
		Box::pin(async move {
			let PipeTransportReceiver {
				mut reader,
				message_tx,
			} = *self;
			read_loop(&mut reader, &message_tx).await
		})
	}
}

async fn write_frame<W>(writer: &mut W, message: &Value) -> Result<()>
where
	W: AsyncWrite + Unpin,
{
	let bytes = serde_json::to_vec(message)?;
	let length = u32::try_from(bytes.len())
		.map_err(|_| Error::TransportError(format!("Frame too large: {} bytes", bytes.len())))?;

	writer
		.write_all(&length.to_le_bytes())
		.await
		.map_err(|e| Error::TransportError(format!("Failed to write length prefix: {e}")))?;
	writer
		.write_all(&bytes)
		.await
		.map_err(|e| Error::TransportError(format!("Failed to write frame: {e}")))?;
	writer.flush().await?;

	tracing::trace!(len = bytes.len(), "frame sent");
	Ok(())
}

async fn read_loop<R>(reader: &mut R, message_tx: &mpsc::UnboundedSender<Value>) -> Result<()>
where
	R: AsyncRead + Unpin,
{
	loop {
		if message_tx.is_closed() {
			return Ok(());
		}

		let mut len_buf = [0u8; 4];
		reader
			.read_exact(&mut len_buf)
			.await
			.map_err(|e| Error::TransportError(format!("Failed to read length prefix: {e}")))?;
		let length = u32::from_le_bytes(len_buf) as usize;

		if length > MAX_FRAME_LEN {
			return Err(Error::ProtocolError(format!(
				"Frame length {length} exceeds limit of {MAX_FRAME_LEN} bytes"
			)));
		}

		let mut buf = vec![0u8; length];
		reader
			.read_exact(&mut buf)
			.await
			.map_err(|e| Error::TransportError(format!("Failed to read frame body: {e}")))?;

		let message: Value = match serde_json::from_slice(&buf) {
			Ok(value) => value,
			Err(e) => {
				tracing::warn!(error = %e, "dropping frame with invalid JSON");
				continue;
			}
		};

		if message_tx.send(message).is_err() {
			tracing::debug!("message receiver dropped, stopping reader");
			return Ok(());
		}
	}
}
