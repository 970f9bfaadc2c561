//! # yapp core
//!
//! The concurrent probing pipeline.
//!
//! * **[`runner`]**: orchestrates one run from the first target to the last flushed line.
//! * **[`pool`]**: bounded worker pool pulling targets from a shared queue.
//! * **[`prober`]**: one timed connection attempt plus escalation on failure.
//! * **[`dedup`]**: single-owner record of hosts that were already escalated.
//! * **[`log_sink`]**: single-writer, block-atomic output stream.
//! * **[`diagnostics`]**: `ping`/`traceroute` and friends, run as external commands.
//!
//! Shared resources are never behind a lock held by callers: the host cache
//! and the output writer each belong to exactly one task, reached through
//! channels.

pub mod dedup;
pub mod diagnostics;
pub mod log_sink;
pub mod pool;
pub mod prober;
pub mod runner;


pub use diagnostics::{Diagnostics, SystemDiagnostics};
pub use runner::{RunSummary, run};
