//! Wire types for the Wireless Data Service (WDS) protocol.
//!
//! This crate contains the serde-serializable types exchanged with the device
//! over the framed JSON connection in `wds-runtime`. These types represent the
//! "protocol layer" - the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization/deserialization and display
//! - **1:1 with protocol**: One input/output pair per device message
//! - **Stable**: Changes only when the wire protocol changes
//!
//! Parsing of operator input into these types lives in `wds-cli`.

pub mod failure;
pub mod messages;
pub mod types;

pub use failure::*;
pub use messages::*;
pub use types::*;
