mod commands;
mod terminal;

use std::process::ExitCode;
use std::sync::Arc;

use commands::CommandLine;
use yapp_common::network::target;
use yapp_common::{error, success};
use yapp_core::{RunSummary, SystemDiagnostics, runner};

use crate::terminal::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();
    logging::init_logging(commands.verbose);

    match probe(commands).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn probe(commands: CommandLine) -> anyhow::Result<()> {
    let cfg = commands.to_config()?;
    let targets = target::from_path(cfg.target_file.as_deref())?;

    let diagnostics = Arc::new(SystemDiagnostics::for_current_platform());
    let summary: RunSummary = runner::run(&cfg, targets, diagnostics, std::io::stdout()).await?;

    let report = summary.report;
    success!(
        "Run complete: {} probed, {} succeeded, {} failed, {} escalations across {} hosts",
        report.attempted,
        report.succeeded,
        report.failed,
        report.escalated,
        summary.hosts_escalated
    );
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
