//! A single timed TCP connection attempt, with host escalation on failure.
//!
//! Every attempt yields exactly one result line. A failure may additionally
//! trigger the host diagnostics, gated by [`EscalationMode`]: in the default
//! mode the [`HostDedupCache`] lets only the first failure of each host
//! through, however many ports or workers hit that host.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use yapp_common::config::{ConnectTimeout, EscalationMode};
use yapp_common::network::target::Target;

use crate::dedup::HostDedupCache;
use crate::diagnostics::Diagnostics;
use crate::log_sink::LogSink;

/// Why a connection attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("i/o timeout after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("connection refused")]
    Refused,
    #[error("unreachable: {0}")]
    Unreachable(String),
    #[error("{0}")]
    Other(String),
}

impl ProbeError {
    fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused,
            io::ErrorKind::NetworkUnreachable | io::ErrorKind::HostUnreachable => {
                Self::Unreachable(err.to_string())
            }
            _ => Self::Other(err.to_string()),
        }
    }
}

/// Result of one attempt. Logged right away and then only counted.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub target: Target,
    pub succeeded: bool,
    pub elapsed: Duration,
    pub remote_addr: Option<SocketAddr>,
    pub error: Option<ProbeError>,
    /// Whether this attempt ran the host diagnostics.
    pub escalated: bool,
}

impl ProbeOutcome {
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1_000.0
    }

    /// The result line for this attempt.
    pub fn log_line(&self) -> String {
        let mut line = if self.succeeded {
            let remote = self
                .remote_addr
                .map_or_else(|| String::from("unknown"), |addr| addr.to_string());
            format!(
                "Connection succeeded.\tserver={} port={} remote={} time={:.2}ms",
                self.target.host,
                self.target.port,
                remote,
                self.elapsed_millis()
            )
        } else {
            let error = self
                .error
                .as_ref()
                .map_or_else(|| String::from("unknown"), ToString::to_string);
            format!(
                "Connection failed.\tserver={} port={} time={:.2}ms error={}",
                self.target.host,
                self.target.port,
                self.elapsed_millis(),
                error
            )
        };

        if !self.target.annotation.is_empty() {
            line.push_str(" note=");
            line.push_str(&self.target.annotation);
        }
        line
    }
}

/// Everything a worker needs to probe a target, passed in explicitly.
pub struct Prober {
    timeout: ConnectTimeout,
    escalation: EscalationMode,
    sink: LogSink,
    cache: HostDedupCache,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Prober {
    pub fn new(
        timeout: ConnectTimeout,
        sink: LogSink,
        cache: HostDedupCache,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            timeout,
            escalation: EscalationMode::default(),
            sink,
            cache,
            diagnostics,
        }
    }

    pub fn with_escalation(mut self, escalation: EscalationMode) -> Self {
        self.escalation = escalation;
        self
    }

    /// Connects to `target`, logs the result and escalates on failure.
    ///
    /// Errors only when the sink or the host cache is gone; a failed
    /// connection is a regular outcome.
    pub async fn probe(&self, target: Target) -> anyhow::Result<ProbeOutcome> {
        let limit: Duration = self.timeout.get();
        let started = Instant::now();
        let attempt = timeout(limit, TcpStream::connect((target.host.as_str(), target.port))).await;
        let elapsed = started.elapsed();

        let (remote_addr, error) = match attempt {
            Ok(Ok(stream)) => (stream.peer_addr().ok(), None),
            Ok(Err(e)) => (None, Some(ProbeError::from_io(&e))),
            Err(_elapsed) => (None, Some(ProbeError::Timeout(limit))),
        };

        let mut outcome = ProbeOutcome {
            succeeded: error.is_none(),
            target,
            elapsed,
            remote_addr,
            error,
            escalated: false,
        };
        self.sink.submit(outcome.log_line()).await?;

        if !outcome.succeeded && self.should_escalate(&outcome.target.host).await? {
            self.escalate(&outcome.target.host).await?;
            outcome.escalated = true;
        }

        Ok(outcome)
    }

    async fn should_escalate(&self, host: &str) -> anyhow::Result<bool> {
        match self.escalation {
            EscalationMode::Once => Ok(self.cache.check_and_mark(host).await?),
            EscalationMode::EveryFailure => Ok(true),
            EscalationMode::Off => Ok(false),
        }
    }

    async fn escalate(&self, host: &str) -> anyhow::Result<()> {
        self.sink.submit(format!("Escalating.\tserver={host}")).await?;

        let reachability = self.diagnostics.reachability(host).await;
        self.sink.submit(reachability.to_block()).await?;

        let path = self.diagnostics.path_trace(host).await;
        self.sink.submit(path.to_block()).await?;

        Ok(())
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
