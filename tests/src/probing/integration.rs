#![cfg(test)]
use std::sync::Arc;

use yapp_common::config::{Config, EscalationMode};
use yapp_common::network::target::Target;
use yapp_core::runner;

use crate::utils::{CapturedOutput, CountingDiagnostics, closed_port, open_port};

fn config(concurrency: usize) -> Config {
    Config::new(concurrency, 2_000).unwrap()
}

/// Two ports down on one host, one port up on another.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_hosts_escalate_the_failing_one_once() {
    let output = CapturedOutput::default();
    let diagnostics = Arc::new(CountingDiagnostics::default());
    let targets = vec![
        Target::new("localhost", closed_port().await),
        Target::new("localhost", closed_port().await),
        Target::new("127.0.0.1", open_port().await),
    ];

    let summary = runner::run(&config(5), targets, diagnostics.clone(), output.clone())
        .await
        .unwrap();

    assert_eq!(summary.workers, 3);
    assert_eq!(summary.report.attempted, 3);
    assert_eq!(output.count_starting_with("Connection failed.\tserver=localhost"), 2);
    assert_eq!(output.count_starting_with("Connection succeeded.\tserver=127.0.0.1"), 1);
    assert_eq!(output.count_starting_with("Escalating.\tserver=localhost"), 1);

    assert_eq!(diagnostics.pings().get("localhost"), Some(&1));
    assert_eq!(diagnostics.traces().get("localhost"), Some(&1));
    assert!(!diagnostics.pings().contains_key("127.0.0.1"));
}

#[tokio::test]
async fn empty_target_list_is_a_clean_run() {
    let output = CapturedOutput::default();
    let diagnostics = Arc::new(CountingDiagnostics::default());

    let summary = runner::run(&config(5), Vec::new(), diagnostics.clone(), output.clone())
        .await
        .unwrap();

    assert_eq!(summary.report.attempted, 0);
    assert!(output.lines().is_empty());
    assert!(diagnostics.pings().is_empty());
    assert!(diagnostics.traces().is_empty());
}

/// Three failing hosts, many ports each: three escalations whatever the pool size.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn escalations_match_distinct_failing_hosts_for_any_concurrency() {
    const HOSTS: [&str; 3] = ["127.0.0.1", "localhost", "::1"];

    let mut ports = Vec::new();
    for _ in 0..6 {
        ports.push(closed_port().await);
    }

    for concurrency in [1, 2, 3, 8, 32] {
        let output = CapturedOutput::default();
        let diagnostics = Arc::new(CountingDiagnostics::default());
        let targets: Vec<Target> = ports
            .iter()
            .flat_map(|&port| HOSTS.into_iter().map(move |host| Target::new(host, port)))
            .collect();

        let cfg = config(concurrency);
        let summary = runner::run(&cfg, targets, diagnostics.clone(), output.clone())
            .await
            .unwrap();

        assert_eq!(summary.report.attempted, 18, "concurrency {concurrency}");
        assert_eq!(summary.report.failed, 18, "concurrency {concurrency}");
        assert_eq!(summary.report.escalated, HOSTS.len(), "concurrency {concurrency}");
        assert_eq!(summary.hosts_escalated, HOSTS.len());
        assert_eq!(output.count_starting_with("Escalating."), HOSTS.len());

        for host in HOSTS {
            assert_eq!(diagnostics.pings().get(host), Some(&1), "{host} at {concurrency}");
            assert_eq!(diagnostics.traces().get(host), Some(&1), "{host} at {concurrency}");
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pool_larger_than_target_list_probes_each_target_once() {
    let output = CapturedOutput::default();
    let diagnostics = Arc::new(CountingDiagnostics::default());
    let open = open_port().await;
    let targets: Vec<Target> = (0..4)
        .map(|idx| Target::new("127.0.0.1", open).with_annotation(format!("target-{idx}")))
        .collect();

    let summary = runner::run(&config(16), targets, diagnostics, output.clone())
        .await
        .unwrap();

    assert_eq!(summary.workers, 4);
    assert_eq!(summary.report.succeeded, 4);

    let lines = output.lines();
    assert_eq!(lines.len(), 4);
    for idx in 0..4 {
        let note = format!("note=target-{idx}");
        assert_eq!(lines.iter().filter(|line| line.ends_with(&note)).count(), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_failure_mode_escalates_each_failed_probe() {
    let output = CapturedOutput::default();
    let diagnostics = Arc::new(CountingDiagnostics::default());
    let targets = vec![
        Target::new("localhost", closed_port().await),
        Target::new("localhost", closed_port().await),
    ];
    let cfg = config(2).with_escalation(EscalationMode::EveryFailure);

    let summary = runner::run(&cfg, targets, diagnostics.clone(), output.clone())
        .await
        .unwrap();

    assert_eq!(summary.report.escalated, 2);
    assert_eq!(diagnostics.pings().get("localhost"), Some(&2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn diagnostic_blocks_are_not_interleaved() {
    let output = CapturedOutput::default();
    let diagnostics = Arc::new(CountingDiagnostics::default());
    let port = closed_port().await;
    let targets = vec![
        Target::new("127.0.0.1", port),
        Target::new("localhost", port),
        Target::new("::1", port),
    ];

    runner::run(&config(3), targets, diagnostics, output.clone())
        .await
        .unwrap();

    let lines = output.lines();
    for (idx, line) in lines.iter().enumerate() {
        if line.starts_with("$ ") {
            assert!(lines[idx + 1].starts_with("1 packets transmitted"), "{lines:#?}");
            assert!(lines[idx + 2].starts_with("error: "), "{lines:#?}");
        }
    }
}
