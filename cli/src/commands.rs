use std::path::PathBuf;

use clap::{ArgAction, Parser};
use yapp_common::config::{Config, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_MS, EscalationMode};

#[derive(Parser, Debug)]
#[command(name = "yapp")]
#[command(about = "Probe TCP reachability of many hosts and diagnose the ones that fail.")]
pub struct CommandLine {
    /// Target list, CSV records formatted as "host,port,annotation"
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Connection timeout in milliseconds
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// Number of concurrent connection attempts
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// When a failed host gets ping and traceroute: once, every-failure or off
    #[arg(long, default_value = "once")]
    pub escalation: EscalationMode,

    /// Print interfaces and routing table before probing
    #[arg(long)]
    pub show_config: bool,

    /// More diagnostic output on stderr (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> anyhow::Result<Config> {
        let cfg = Config::new(self.concurrency, self.timeout)?
            .with_target_file(self.file.clone())
            .with_escalation(self.escalation)
            .with_network_config(self.show_config);
        Ok(cfg)
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
