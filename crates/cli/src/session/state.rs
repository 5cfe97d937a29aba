use std::fmt;

/// Where a data session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	Idle,
	Starting,
	Active,
	Following,
	Stopping,
}

impl SessionState {
	/// Whether the controller may move from `self` to `next`.
	pub fn can_transition_to(self, next: SessionState) -> bool {
		use SessionState::*;

		matches!(
			(self, next),
			(Idle, Starting)
				| (Starting, Active)
				| (Starting, Idle)
				| (Active, Following)
				| (Active, Idle)
				| (Active, Stopping)
				| (Following, Stopping)
				| (Idle, Stopping)
				| (Stopping, Idle)
		)
	}
}

impl fmt::Display for SessionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			SessionState::Idle => "idle",
			SessionState::Starting => "starting",
			SessionState::Active => "active",
			SessionState::Following => "following",
			SessionState::Stopping => "stopping",
		};
		f.write_str(s)
	}
}
