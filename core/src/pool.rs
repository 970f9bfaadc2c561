//! Fixed-size pool of probing workers fed from one shared queue.
//!
//! The orchestrator is the only producer: it pushes every target through the
//! [`WorkQueue`] and then closes it. Workers take turns on the receiving end,
//! probe one target at a time and stop once the queue is closed and empty.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use yapp_common::network::target::Target;
use yapp_common::{debug, error};

use crate::prober::{ProbeOutcome, Prober};

/// Counters gathered by the workers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub escalated: usize,
    /// Attempts that could not be completed because the sink or cache was gone.
    pub aborted: usize,
}

impl PoolReport {
    fn record(&mut self, outcome: &ProbeOutcome) {
        self.attempted += 1;
        if outcome.succeeded {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        if outcome.escalated {
            self.escalated += 1;
        }
    }

    fn merge(&mut self, other: PoolReport) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.escalated += other.escalated;
        self.aborted += other.aborted;
    }
}

/// Producer end of the work queue.
pub struct WorkQueue {
    tx: mpsc::Sender<Target>,
}

impl WorkQueue {
    /// Waits for room in the queue, then enqueues `target`.
    pub async fn push(&self, target: Target) -> anyhow::Result<()> {
        self.tx
            .send(target)
            .await
            .map_err(|e| anyhow::anyhow!("no worker left to probe {}", e.0))
    }

    /// Closes the queue; workers finish what is left and stop.
    pub fn close(self) {
        drop(self.tx);
    }
}

pub struct WorkerPool {
    workers: Vec<JoinHandle<PoolReport>>,
}

impl WorkerPool {
    /// Spawns `size` workers sharing `prober`.
    pub fn start(size: usize, prober: Arc<Prober>) -> (WorkQueue, WorkerPool) {
        let (tx, rx) = mpsc::channel::<Target>(size.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..size)
            .map(|id| tokio::spawn(worker(id, rx.clone(), prober.clone())))
            .collect();

        (WorkQueue { tx }, WorkerPool { workers })
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Waits for every worker and sums their counters.
    ///
    /// A worker that panicked does not cut the wait short; the first such
    /// failure is returned once all workers are done.
    pub async fn join(self) -> anyhow::Result<PoolReport> {
        let mut report = PoolReport::default();
        let mut failure: Option<tokio::task::JoinError> = None;
        for (id, handle) in self.workers.into_iter().enumerate() {
            match handle.await {
                Ok(part) => report.merge(part),
                Err(e) => {
                    error!(worker = id, "worker did not finish: {e}");
                    failure.get_or_insert(e);
                }
            }
        }
        match failure {
            Some(e) => Err(e.into()),
            None => Ok(report),
        }
    }
}

async fn worker(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<Target>>>,
    prober: Arc<Prober>,
) -> PoolReport {
    let mut report = PoolReport::default();
    debug!(worker = id, "worker started");

    loop {
        let next: Option<Target> = queue.lock().await.recv().await;
        let Some(target) = next else {
            break;
        };

        let label: String = target.to_string();
        match prober.probe(target).await {
            Ok(outcome) => report.record(&outcome),
            Err(e) => {
                report.aborted += 1;
                error!(worker = id, "probe of {label} aborted: {e}");
            }
        }
    }

    debug!(worker = id, attempted = report.attempted, "worker finished");
    report
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
