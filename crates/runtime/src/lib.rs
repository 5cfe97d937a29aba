//! Device connection runtime for WDS.
//!
//! Provides length-prefixed JSON framing ([`transport`]), request/response
//! correlation with per-request deadlines ([`connection`]), the
//! [`DeviceClient`] seam used by command logic, and [`Device`] for opening a
//! unix-socket or TCP endpoint.

pub mod client;
pub mod connection;
pub mod device;
pub mod error;
pub mod transport;

pub use client::DeviceClient;
pub use connection::Connection;
pub use device::{Device, DeviceAddress};
pub use error::{Error, Result};
pub use transport::{PipeTransport, TransportParts};
