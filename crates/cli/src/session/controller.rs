use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use wds_protocol::{
	GetPacketServiceStatus, PacketDataHandle, StartNetworkInput, StopNetworkInput, WdsMessage,
};
use wds_runtime::DeviceClient;

use super::state::SessionState;
use super::subscriptions::{CancellationLink, PollSubscription};
use crate::config::Timeouts;
use crate::error::{Result, WdsError};
use crate::output::{LifecycleEvent, Reporter};

/// Why a following session is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Teardown {
	Cancelled,
	Disconnected,
}

enum PollOutcome {
	Connected,
	Disconnected,
	Failed,
	Cancelled,
}

/// Drives one data session: start, optionally follow, stop.
///
/// The controller is a single cooperative task. Every request goes through
/// [`DeviceClient`] with its own deadline and the controller suspends until
/// it resolves; nothing else runs in between except the poll timer and the
/// cancellation link, which are only live while following.
pub struct SessionController<'a> {
	client: &'a dyn DeviceClient,
	reporter: &'a mut dyn Reporter,
	device: String,
	timeouts: Timeouts,
	state: SessionState,
	poll: Option<PollSubscription>,
	link: Option<CancellationLink>,
}

impl<'a> SessionController<'a> {
	pub fn new(
		client: &'a dyn DeviceClient,
		reporter: &'a mut dyn Reporter,
		device: impl Into<String>,
		timeouts: Timeouts,
	) -> Self {
		Self {
			client,
			reporter,
			device: device.into(),
			timeouts,
			state: SessionState::Idle,
			poll: None,
			link: None,
		}
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	/// Starts a session. With `follow`, keeps it open until `follow` is
	/// cancelled or the device reports it disconnected, then stops it.
	///
	/// `None` input starts with the device defaults.
	pub async fn start(
		&mut self,
		input: Option<StartNetworkInput>,
		follow: Option<&CancellationToken>,
	) -> Result<()> {
		self.transition(SessionState::Starting)?;

		let input = input.unwrap_or_default();
		let output = match self.request(&input, self.timeouts.start).await {
			Ok(output) => output,
			Err(err) => {
				self.transition(SessionState::Idle)?;
				return Err(WdsError::from_runtime("start network", err));
			}
		};
		let handle = output.packet_data_handle;

		self.transition(SessionState::Active)?;
		self.reporter.line(&format!("[{}] Network started", self.device));
		self.reporter.line(&format!("\tPacket data handle: '{handle}'"));

		let Some(parent) = follow else {
			self.transition(SessionState::Idle)?;
			return Ok(());
		};

		self.transition(SessionState::Following)?;
		self.link = Some(CancellationLink::register(parent));
		self.reporter.lifecycle(LifecycleEvent::CancellationRegistered);
		self.poll = Some(PollSubscription::arm(self.timeouts.poll_interval));
		self.reporter.lifecycle(LifecycleEvent::PollArmed);
		self.reporter.line("");
		self.reporter.line("Ctrl+C will stop the network");

		self.follow(handle).await
	}

	/// Stops a session by handle without having started it.
	pub async fn stop(&mut self, input: StopNetworkInput) -> Result<()> {
		self.transition(SessionState::Stopping)?;
		self.send_stop(input).await
	}

	async fn follow(&mut self, handle: PacketDataHandle) -> Result<()> {
		loop {
			let cancelled = match (self.link.as_ref(), self.poll.as_mut()) {
				(Some(link), Some(poll)) => tokio::select! {
					biased;
					_ = link.cancelled() => true,
					_ = poll.tick() => false,
				},
				_ => true,
			};
			if cancelled {
				return self.teardown(handle, Teardown::Cancelled).await;
			}

			match self.poll_status().await {
				PollOutcome::Connected | PollOutcome::Failed => {}
				PollOutcome::Disconnected => {
					return self.teardown(handle, Teardown::Disconnected).await;
				}
				PollOutcome::Cancelled => {
					return self.teardown(handle, Teardown::Cancelled).await;
				}
			}
		}
	}

	async fn poll_status(&mut self) -> PollOutcome {
		self.reporter.lifecycle(LifecycleEvent::RequestSent {
			message: GetPacketServiceStatus::NAME,
		});
		let client = self.client;
		let call = client.call(&GetPacketServiceStatus, self.timeouts.poll_request);

		let result = match self.link.as_ref() {
			Some(link) => tokio::select! {
				biased;
				_ = link.cancelled() => None,
				result = call => Some(result),
			},
			None => Some(call.await),
		};

		match result {
			None => {
				debug!("cancellation arrived during status poll");
				PollOutcome::Cancelled
			}
			Some(Ok(output)) => {
				let status = output.connection_status;
				self.reporter
					.line(&format!("[{}] Connection status: '{status}'", self.device));
				if status.is_connected() {
					PollOutcome::Connected
				} else {
					self.reporter.line(&format!(
						"[{}] Stopping after detecting disconnection",
						self.device
					));
					PollOutcome::Disconnected
				}
			}
			Some(Err(err)) => {
				let err = WdsError::from_runtime("get packet service status", err);
				for line in err.report_lines() {
					self.reporter.error(&line);
				}
				PollOutcome::Failed
			}
		}
	}

	async fn teardown(&mut self, handle: PacketDataHandle, cause: Teardown) -> Result<()> {
		self.release_follow_resources();
		self.transition(SessionState::Stopping)?;
		if cause == Teardown::Cancelled {
			self.reporter.line("Network cancelled... releasing resources");
		}

		self.send_stop(StopNetworkInput {
			packet_data_handle: handle,
			disable_autoconnect: None,
		})
		.await
	}

	/// Disarms the poll timer, then unregisters the cancellation link.
	/// Each is released at most once.
	fn release_follow_resources(&mut self) {
		if self.poll.take().is_some() {
			self.reporter.lifecycle(LifecycleEvent::PollDisarmed);
		}
		if self.link.take().is_some() {
			self.reporter.lifecycle(LifecycleEvent::CancellationUnregistered);
		}
	}

	async fn send_stop(&mut self, input: StopNetworkInput) -> Result<()> {
		let result = self.request(&input, self.timeouts.stop).await;
		self.transition(SessionState::Idle)?;

		match result {
			Ok(_) => {
				self.reporter
					.line(&format!("[{}] Network stopped", self.device));
				Ok(())
			}
			Err(err) => Err(WdsError::from_runtime("stop network", err)),
		}
	}

	async fn request<M>(&mut self, input: &M, deadline: Duration) -> wds_runtime::Result<M::Output>
	where
		M: WdsMessage + Sync,
	{
		self.reporter
			.lifecycle(LifecycleEvent::RequestSent { message: M::NAME });
		let client = self.client;
		client.call(input, deadline).await
	}

	fn transition(&mut self, next: SessionState) -> Result<()> {
		if !self.state.can_transition_to(next) {
			return Err(WdsError::InvalidTransition {
				from: self.state,
				to: next,
			});
		}
		info!(from = %self.state, to = %next, "session transition");
		self.state = next;
		Ok(())
	}
}
