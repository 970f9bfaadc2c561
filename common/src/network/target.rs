//! # Probe Target Model
//!
//! Defines what a single probe is aimed at and how target lists are read.
//!
//! A target list is a headerless CSV file where every record is:
//! * `host` - name or address handed to the OS resolver as is.
//! * `port` - TCP port, `0..=65535`.
//! * `annotation` - free text carried along for the operator.
//!
//! Lists are all-or-nothing: one malformed record rejects the whole file.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::TargetSourceError;

const FIELDS_PER_RECORD: usize = 3;

/// One (host, port) pair to probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub annotation: String,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            annotation: String::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = annotation.into();
        self
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Reads the target list at `path`.
///
/// `None` is a valid source with no targets; the run then probes nothing.
pub fn from_path(path: Option<&Path>) -> Result<Vec<Target>, TargetSourceError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let file = File::open(path).map_err(|source| TargetSourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    from_reader(file)
}

/// Parses CSV records from any reader, keeping their order.
pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Target>, TargetSourceError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(reader);

    let mut targets: Vec<Target> = Vec::new();
    for record in csv_reader.records() {
        targets.push(parse_record(&record?)?);
    }

    Ok(targets)
}

fn parse_record(record: &StringRecord) -> Result<Target, TargetSourceError> {
    let line: u64 = record.position().map_or(0, |pos| pos.line());

    if record.len() != FIELDS_PER_RECORD {
        return Err(TargetSourceError::FieldCount {
            line,
            found: record.len(),
        });
    }

    let port_str: &str = &record[1];
    let port = port_str
        .parse::<u16>()
        .map_err(|_| TargetSourceError::InvalidPort {
            line,
            value: port_str.to_string(),
        })?;

    Ok(Target::new(&record[0], port).with_annotation(&record[2]))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
