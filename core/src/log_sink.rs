//! The single **ordered output stream** of a run.
//!
//! Every worker reports through a cloned [`LogSink`]. Blocks are handed to one
//! consumer task that owns the writer, stamps each line with
//! `[YYYY/MM/DD HH:MM:SS host] ` and writes the whole block in one go, so two
//! submissions never interleave.
//!
//! [`LogSink::submit`] is a rendezvous: it resolves only once the consumer has
//! written the block. The consumer exits when the last [`LogSink`] clone is
//! dropped and the queue is empty; [`SinkHandle::drain`] waits for that.

use std::io::{self, Write};

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use yapp_common::debug;

const QUEUE_DEPTH: usize = 64;
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("log sink is closed")]
pub struct SinkClosed;

struct Block {
    text: String,
    written: oneshot::Sender<()>,
}

/// Producer side of the output stream.
#[derive(Clone)]
pub struct LogSink {
    tx: mpsc::Sender<Block>,
}

/// Owner side of the output stream. Yields the writer back once drained.
pub struct SinkHandle<W> {
    consumer: JoinHandle<io::Result<W>>,
}

/// Renders the per-line prefix.
#[derive(Debug, Clone)]
pub struct LinePrefix {
    hostname: String,
}

impl LinePrefix {
    /// Prefix carrying this machine's hostname.
    pub fn local() -> Self {
        let hostname = hostname::get()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| String::from("localhost"));
        Self { hostname }
    }

    pub fn with_hostname(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }

    pub fn render(&self, now: DateTime<Local>) -> String {
        format!("[{} {}] ", now.format(TIMESTAMP_FORMAT), self.hostname)
    }
}

impl LogSink {
    /// Starts the consumer task writing into `writer`.
    pub fn spawn<W>(writer: W, prefix: LinePrefix) -> (LogSink, SinkHandle<W>)
    where
        W: Write + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Block>(QUEUE_DEPTH);
        let consumer = tokio::task::spawn_blocking(move || consume(rx, writer, prefix));

        (LogSink { tx }, SinkHandle { consumer })
    }

    /// Queues `text` and waits until it has been written.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), SinkClosed> {
        let (written, ack) = oneshot::channel();
        let block = Block {
            text: text.into(),
            written,
        };

        self.tx.send(block).await.map_err(|_| SinkClosed)?;
        ack.await.map_err(|_| SinkClosed)
    }
}

impl<W> SinkHandle<W> {
    /// Waits for the consumer to flush everything and stop.
    ///
    /// Resolves only after every [`LogSink`] clone has been dropped.
    pub async fn drain(self) -> anyhow::Result<W> {
        let writer = self.consumer.await??;
        Ok(writer)
    }
}

fn consume<W: Write>(
    mut rx: mpsc::Receiver<Block>,
    mut writer: W,
    prefix: LinePrefix,
) -> io::Result<W> {
    let mut blocks: usize = 0;

    while let Some(block) = rx.blocking_recv() {
        let rendered: String = render_block(&block.text, &prefix.render(Local::now()));
        writer.write_all(rendered.as_bytes())?;
        writer.flush()?;
        blocks += 1;

        // The producer may have given up waiting; the block is written either way.
        let _ = block.written.send(());
    }

    debug!(blocks, "log sink drained");
    Ok(writer)
}

fn render_block(text: &str, prefix: &str) -> String {
    let mut rendered = String::with_capacity(text.len() + prefix.len() * 4);
    for line in text.lines() {
        rendered.push_str(prefix);
        rendered.push_str(line);
        rendered.push('\n');
    }
    rendered
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
