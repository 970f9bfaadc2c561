//! Host diagnostics delegated to the operating system.
//!
//! The prober only needs two actions per failing host, a reachability probe
//! (`ping`) and a path trace (`traceroute`/`tracert`). Both are external
//! commands whose text output is captured and logged verbatim.
//!
//! [`Diagnostics`] is the seam the prober depends on; [`SystemDiagnostics`]
//! spawns the real commands with flags chosen per [`Platform`].

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

pub const PING_COUNT: u32 = 5;
pub const MAX_HOPS: u32 = 15;

/// Operating system families with distinct command flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            _ => Self::Unix,
        }
    }

    pub fn reachability_command(self, host: &str) -> CommandLine {
        let count = PING_COUNT.to_string();
        match self {
            Self::Windows => {
                CommandLine::new("ping", &["-n", count.as_str(), "-w", "100", host])
            }
            Self::MacOs | Self::Unix => {
                CommandLine::new("ping", &["-c", count.as_str(), "-i", "0.1", host])
            }
        }
    }

    pub fn path_trace_command(self, host: &str) -> CommandLine {
        let hops = MAX_HOPS.to_string();
        match self {
            Self::Windows => {
                CommandLine::new("tracert", &["-w", "100", "-h", hops.as_str(), "-d", host])
            }
            Self::MacOs | Self::Unix => {
                CommandLine::new("traceroute", &["-w", "1", "-m", hops.as_str(), "-I", host])
            }
        }
    }

    pub fn interfaces_command(self) -> CommandLine {
        match self {
            Self::Windows => CommandLine::new("ipconfig", &[]),
            Self::MacOs | Self::Unix => CommandLine::new("ifconfig", &["-a"]),
        }
    }

    pub fn routes_command(self) -> CommandLine {
        match self {
            Self::Windows => CommandLine::new("route", &["PRINT"]),
            Self::MacOs => CommandLine::new("netstat", &["-rn"]),
            Self::Unix => CommandLine::new("route", &[]),
        }
    }
}

/// Program plus arguments, displayable exactly as it is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// What one diagnostic action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    /// The command as it was run.
    pub command: String,
    /// Captured standard output.
    pub output: String,
    pub error: Option<String>,
}

impl DiagnosticReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Renders the report as a single log block.
    pub fn to_block(&self) -> String {
        let mut block = format!("$ {}", self.command);
        let output = self.output.trim_end();
        if !output.is_empty() {
            block.push('\n');
            block.push_str(output);
        }
        if let Some(error) = &self.error {
            block.push_str("\nerror: ");
            block.push_str(error);
        }
        block
    }
}

#[async_trait]
pub trait Diagnostics: Send + Sync {
    /// Checks whether `host` answers at all.
    async fn reachability(&self, host: &str) -> DiagnosticReport;

    /// Lists the hops towards `host`.
    async fn path_trace(&self, host: &str) -> DiagnosticReport;

    /// Describes the local interfaces and routing table.
    async fn network_config(&self) -> Vec<DiagnosticReport>;
}

/// Runs the platform's own `ping`, `traceroute`, `ifconfig` and `route`.
#[derive(Debug, Clone, Copy)]
pub struct SystemDiagnostics {
    platform: Platform,
}

impl SystemDiagnostics {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    pub fn for_current_platform() -> Self {
        Self::new(Platform::current())
    }

    async fn run_for_host(&self, command: CommandLine, host: &str) -> DiagnosticReport {
        // Arguments never pass through a shell, but a leading dash would still
        // be read as an option by the command itself.
        if host.starts_with('-') {
            return DiagnosticReport {
                command: command.to_string(),
                output: String::new(),
                error: Some(format!("refusing to pass option-like host '{host}'")),
            };
        }
        run(&command).await
    }
}

#[async_trait]
impl Diagnostics for SystemDiagnostics {
    async fn reachability(&self, host: &str) -> DiagnosticReport {
        self.run_for_host(self.platform.reachability_command(host), host).await
    }

    async fn path_trace(&self, host: &str) -> DiagnosticReport {
        self.run_for_host(self.platform.path_trace_command(host), host).await
    }

    async fn network_config(&self) -> Vec<DiagnosticReport> {
        vec![
            run(&self.platform.interfaces_command()).await,
            run(&self.platform.routes_command()).await,
        ]
    }
}

/// Spawns `command`, waits for it and captures its output.
pub async fn run(command: &CommandLine) -> DiagnosticReport {
    let result = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .output()
        .await;

    match result {
        Ok(output) => {
            let stdout: String = String::from_utf8_lossy(&output.stdout).into_owned();
            let error: Option<String> = if output.status.success() {
                None
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr = stderr.trim();
                Some(if stderr.is_empty() {
                    output.status.to_string()
                } else {
                    format!("{}: {stderr}", output.status)
                })
            };

            DiagnosticReport {
                command: command.to_string(),
                output: stdout,
                error,
            }
        }
        Err(e) => DiagnosticReport {
            command: command.to_string(),
            output: String::new(),
            error: Some(e.to_string()),
        },
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
