//! # yapp common
//!
//! Types shared by every crate in the workspace: the validated run
//! [`config`], the [`error`] taxonomy for setup failures, the probe
//! [`network::target`] model with its CSV source, and the logging macros
//! that route through `tracing`.

pub mod config;
pub mod error;
pub mod log;
pub mod network;

pub use tracing;
