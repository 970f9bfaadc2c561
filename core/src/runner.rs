//! Wires one probing run together.
//!
//! Start-up and shutdown order matters here: the sink may only be told that
//! no more blocks are coming after every worker has been joined, otherwise a
//! worker could be left waiting on a submission that is never written.

use std::io::Write;
use std::sync::Arc;

use yapp_common::config::Config;
use yapp_common::network::target::Target;
use yapp_common::{info, warn};

use crate::dedup::HostDedupCache;
use crate::diagnostics::Diagnostics;
use crate::log_sink::{LinePrefix, LogSink};
use crate::pool::{PoolReport, WorkerPool};
use crate::prober::Prober;

/// What a finished run reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub workers: usize,
    pub report: PoolReport,
    /// Distinct hosts recorded by the host cache.
    pub hosts_escalated: usize,
}

/// Probes every target and writes the result stream into `output`.
pub async fn run<W>(
    cfg: &Config,
    targets: Vec<Target>,
    diagnostics: Arc<dyn Diagnostics>,
    output: W,
) -> anyhow::Result<RunSummary>
where
    W: Write + Send + 'static,
{
    run_with_prefix(cfg, targets, diagnostics, output, LinePrefix::local()).await
}

pub async fn run_with_prefix<W>(
    cfg: &Config,
    targets: Vec<Target>,
    diagnostics: Arc<dyn Diagnostics>,
    output: W,
    prefix: LinePrefix,
) -> anyhow::Result<RunSummary>
where
    W: Write + Send + 'static,
{
    let (sink, sink_handle) = LogSink::spawn(output, prefix);
    let (cache, cache_owner) = HostDedupCache::spawn();

    if cfg.show_network_config {
        for report in diagnostics.network_config().await {
            if !report.succeeded() {
                warn!("network configuration command '{}' failed", report.command);
            }
            sink.submit(report.to_block()).await?;
        }
    }

    let size: usize = cfg.effective_concurrency(targets.len());
    info!("Probing {} targets with {} workers", targets.len(), size);

    let prober = Prober::new(cfg.timeout, sink.clone(), cache.clone(), diagnostics)
        .with_escalation(cfg.escalation);
    let (queue, pool) = WorkerPool::start(size, Arc::new(prober));
    let workers: usize = pool.len();

    for target in targets {
        if let Err(e) = queue.push(target).await {
            warn!("stopped feeding targets: {e}");
            break;
        }
    }
    queue.close();

    let joined: anyhow::Result<PoolReport> = pool.join().await;

    // Workers are gone; dropping the last handles lets both serializers finish.
    drop(cache);
    drop(sink);
    let hosts_escalated: usize = cache_owner.await?;
    sink_handle.drain().await?;

    let report: PoolReport = joined?;

    Ok(RunSummary {
        workers,
        report,
        hosts_escalated,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
