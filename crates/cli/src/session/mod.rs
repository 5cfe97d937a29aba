//! Data session lifecycle: start, follow, stop.

mod controller;
mod state;
mod subscriptions;

#[cfg(test)]
mod tests;

pub use controller::SessionController;
pub use state::SessionState;
pub use subscriptions::{CancellationLink, PollSubscription};
