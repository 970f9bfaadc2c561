//! Logging macros shared across the workspace.
//!
//! Thin wrappers over `tracing` so that every crate reports operational
//! events the same way. `success!` is an `INFO` event under its own target,
//! which the terminal formatter renders with a distinct symbol.

pub const SUCCESS_TARGET: &str = "yapp::success";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::tracing::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "yapp::success", $($arg)*)
    };
}
