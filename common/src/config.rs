use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_TIMEOUT_MS: u64 = 500;

/// Decides whether a failed connection leads to host diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscalationMode {
    /// Escalate the first failure of each host, skip the rest.
    #[default]
    Once,
    /// Escalate every failed connection, even for hosts seen before.
    EveryFailure,
    /// Never run diagnostics.
    Off,
}

impl FromStr for EscalationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "once" => Ok(Self::Once),
            "every-failure" | "always" => Ok(Self::EveryFailure),
            "off" | "never" => Ok(Self::Off),
            other => Err(format!(
                "invalid escalation mode '{other}' (expected once, every-failure or off)"
            )),
        }
    }
}

/// Connect timeout that is known to be usable.
///
/// A zero duration would make every attempt fail before the handshake
/// starts, so it is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectTimeout(Duration);

impl ConnectTimeout {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self(timeout))
    }

    pub fn from_millis(ms: u64) -> Result<Self, ConfigError> {
        Self::new(Duration::from_millis(ms))
    }

    pub fn get(self) -> Duration {
        self.0
    }
}

impl Default for ConnectTimeout {
    fn default() -> Self {
        Self(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }
}

/// Settings for one probing run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound on simultaneous connection attempts.
    pub concurrency: NonZeroUsize,
    pub timeout: ConnectTimeout,
    /// CSV file with `host,port,annotation` records. `None` means no targets.
    pub target_file: Option<PathBuf>,
    pub escalation: EscalationMode,
    /// Dump interface and routing information before probing.
    pub show_network_config: bool,
}

impl Config {
    pub fn new(concurrency: usize, timeout_ms: u64) -> Result<Self, ConfigError> {
        let concurrency = NonZeroUsize::new(concurrency).ok_or(ConfigError::ZeroConcurrency)?;
        let timeout = ConnectTimeout::from_millis(timeout_ms)?;

        Ok(Self {
            concurrency,
            timeout,
            target_file: None,
            escalation: EscalationMode::default(),
            show_network_config: false,
        })
    }

    pub fn with_target_file(mut self, path: Option<PathBuf>) -> Self {
        self.target_file = path.filter(|p| !p.as_os_str().is_empty());
        self
    }

    pub fn with_escalation(mut self, escalation: EscalationMode) -> Self {
        self.escalation = escalation;
        self
    }

    pub fn with_network_config(mut self, show: bool) -> Self {
        self.show_network_config = show;
        self
    }

    /// Number of workers worth starting for `target_count` targets.
    pub fn effective_concurrency(&self, target_count: usize) -> usize {
        self.concurrency.get().min(target_count)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: NonZeroUsize::new(DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN),
            timeout: ConnectTimeout::default(),
            target_file: None,
            escalation: EscalationMode::default(),
            show_network_config: false,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
