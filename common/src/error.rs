use std::path::PathBuf;

use thiserror::Error;

/// Reasons a target list is refused as a whole.
#[derive(Error, Debug)]
pub enum TargetSourceError {
    #[error("cannot open target list {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("target list read error: {0}")]
    Read(#[from] csv::Error),
    #[error("line {line}: expected 3 fields (host,port,annotation), found {found}")]
    FieldCount { line: u64, found: usize },
    #[error("line {line}: invalid port number '{value}'")]
    InvalidPort { line: u64, value: String },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("connection timeout must be greater than zero")]
    ZeroTimeout,
}
