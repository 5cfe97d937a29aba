//! Resources a following session holds until teardown.
//!
//! Both are plain owned values: dropping them releases the timer or the
//! cancellation registration, so the controller keeps them in `Option`s and
//! `take()`s them to release each one exactly once.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Periodic status poll timer. The first tick fires one full period after
/// arming.
#[derive(Debug)]
pub struct PollSubscription {
	interval: Interval,
}

impl PollSubscription {
	pub fn arm(period: Duration) -> Self {
		let mut interval = interval_at(Instant::now() + period, period);
		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
		Self { interval }
	}

	pub async fn tick(&mut self) {
		self.interval.tick().await;
	}
}

/// Registration with the process interrupt.
///
/// Holds a child of the process token, so it observes process-level
/// cancellation without being able to cancel anything else.
#[derive(Debug)]
pub struct CancellationLink {
	token: CancellationToken,
}

impl CancellationLink {
	pub fn register(parent: &CancellationToken) -> Self {
		Self {
			token: parent.child_token(),
		}
	}

	pub async fn cancelled(&self) {
		self.token.cancelled().await;
	}
}
