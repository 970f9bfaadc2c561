#![cfg(test)]
use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;
use yapp_common::config::Config;
use yapp_common::error::TargetSourceError;
use yapp_common::network::target;
use yapp_core::runner;

use crate::utils::{CapturedOutput, CountingDiagnostics, open_port};

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Loads the list the way the binary does, then runs only if it parsed.
async fn load_and_run(cfg: &Config, output: CapturedOutput) -> anyhow::Result<runner::RunSummary> {
    let targets = target::from_path(cfg.target_file.as_deref())?;
    let diagnostics = Arc::new(CountingDiagnostics::default());
    runner::run(cfg, targets, diagnostics, output).await
}

#[tokio::test]
async fn malformed_port_aborts_before_any_probe() {
    let port = open_port().await;
    let file = csv_file(&format!("127.0.0.1,{port},ok\n127.0.0.1,ssh,broken\n"));
    let cfg = Config::default().with_target_file(Some(file.path().to_path_buf()));
    let output = CapturedOutput::default();

    let err = load_and_run(&cfg, output.clone()).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<TargetSourceError>(),
        Some(TargetSourceError::InvalidPort { line: 2, .. })
    ));
    assert!(output.lines().is_empty());
}

#[tokio::test]
async fn unreadable_file_is_fatal() {
    let file = csv_file("");
    let missing = file.path().with_extension("gone");
    let cfg = Config::default().with_target_file(Some(missing));

    let err = load_and_run(&cfg, CapturedOutput::default()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TargetSourceError>(),
        Some(TargetSourceError::Open { .. })
    ));
}

#[tokio::test]
async fn file_targets_are_probed_in_a_full_run() {
    let port = open_port().await;
    let file = csv_file(&format!("127.0.0.1,{port},web frontend\n"));
    let cfg = Config::default().with_target_file(Some(file.path().to_path_buf()));
    let output = CapturedOutput::default();

    let summary = load_and_run(&cfg, output.clone()).await.unwrap();

    assert_eq!(summary.report.succeeded, 1);
    let lines = output.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("note=web frontend"));
}
