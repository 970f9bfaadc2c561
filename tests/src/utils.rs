use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::net::TcpListener;
use yapp_core::diagnostics::{DiagnosticReport, Diagnostics};

/// In-memory stdout stand-in that can be read while the sink still owns it.
#[derive(Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    /// Result lines with the `[date time host] ` prefix removed.
    pub fn lines(&self) -> Vec<String> {
        let raw = String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned();
        raw.lines()
            .map(|line| line.split_once("] ").map_or(line, |(_, rest)| rest).to_string())
            .collect()
    }

    pub fn count_starting_with(&self, prefix: &str) -> usize {
        self.lines().iter().filter(|line| line.starts_with(prefix)).count()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Counts how often each host went through each diagnostic action.
#[derive(Default)]
pub struct CountingDiagnostics {
    pings: Mutex<HashMap<String, usize>>,
    traces: Mutex<HashMap<String, usize>>,
}

impl CountingDiagnostics {
    pub fn pings(&self) -> HashMap<String, usize> {
        self.pings.lock().unwrap().clone()
    }

    pub fn traces(&self) -> HashMap<String, usize> {
        self.traces.lock().unwrap().clone()
    }

    fn report(command: String) -> DiagnosticReport {
        DiagnosticReport {
            command,
            output: String::from("1 packets transmitted, 0 received"),
            error: Some(String::from("exit status: 1")),
        }
    }
}

#[async_trait]
impl Diagnostics for CountingDiagnostics {
    async fn reachability(&self, host: &str) -> DiagnosticReport {
        *self.pings.lock().unwrap().entry(host.to_string()).or_default() += 1;
        // Give racing workers a chance to overlap with an escalation in flight.
        tokio::task::yield_now().await;
        Self::report(format!("ping {host}"))
    }

    async fn path_trace(&self, host: &str) -> DiagnosticReport {
        *self.traces.lock().unwrap().entry(host.to_string()).or_default() += 1;
        Self::report(format!("traceroute {host}"))
    }

    async fn network_config(&self) -> Vec<DiagnosticReport> {
        Vec::new()
    }
}

pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

pub async fn open_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });
    port
}
