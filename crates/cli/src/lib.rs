//! Command-line control of mobile data sessions over the WDS protocol.
//!
//! The binary parses arguments into an [`commands::Operation`], opens the
//! device named by `--device` and runs the operation, reporting through an
//! [`output::Reporter`].

pub mod builder;
pub mod cli;
pub mod commands;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod logging;
pub mod output;
pub mod properties;
pub mod session;
pub mod styles;

#[cfg(test)]
mod testing;
