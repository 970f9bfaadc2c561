//! Per-run record of hosts that already went through diagnostics.
//!
//! The set lives inside one owner task. Callers never touch it directly:
//! they send the host together with a reply channel and wait for the answer,
//! so "first caller wins" holds without any lock around the set.

use std::collections::HashSet;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use yapp_common::debug;

const REQUEST_DEPTH: usize = 32;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("host cache owner has stopped")]
pub struct CacheClosed;

type Request = (String, oneshot::Sender<bool>);

/// Handle to the host cache owner. Cheap to clone.
#[derive(Clone)]
pub struct HostDedupCache {
    tx: mpsc::Sender<Request>,
}

impl HostDedupCache {
    /// Starts the owner task.
    ///
    /// The owner stops once every handle is dropped and returns how many
    /// distinct hosts were marked.
    pub fn spawn() -> (Self, JoinHandle<usize>) {
        let (tx, mut rx) = mpsc::channel::<Request>(REQUEST_DEPTH);

        let owner = tokio::spawn(async move {
            let mut escalated: HashSet<String> = HashSet::new();
            while let Some((host, reply)) = rx.recv().await {
                let first: bool = escalated.insert(host);
                let _ = reply.send(first);
            }
            debug!(hosts = escalated.len(), "host cache closed");
            escalated.len()
        });

        (Self { tx }, owner)
    }

    /// Returns `true` only for the first call with `host` in this run.
    pub async fn check_and_mark(&self, host: &str) -> Result<bool, CacheClosed> {
        let (reply, answer) = oneshot::channel();
        self.tx
            .send((host.to_string(), reply))
            .await
            .map_err(|_| CacheClosed)?;
        answer.await.map_err(|_| CacheClosed)
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
