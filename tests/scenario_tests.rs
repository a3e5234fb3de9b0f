//! End-to-end runs against the in-process fake backend under paused time.

use std::time::Duration;

use pgfailover::application::Orchestrator;
use pgfailover::domain::StopReason;
use pgfailover::testkit::{config, DownWindow, FakeBackend};
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn single_failover_is_one_outage_of_about_three_seconds() {
    let backend = FakeBackend::with_outages(vec![DownWindow::between(
        Duration::from_secs(5),
        Duration::from_secs(8),
    )]);
    let orchestrator = Orchestrator::new(config::run(2, 10, 0.6), backend.connector());

    let summary = orchestrator.run().await.expect("run completes");

    assert_eq!(summary.outages, 1);
    assert!(
        (2.5..=4.5).contains(&summary.total_outage_secs),
        "outage lasted {}s",
        summary.total_outage_secs
    );
    assert!(!summary.outage_open_at_end);
    assert!(summary.inserts_ok > 0);
    assert!(summary.selects_ok > 0);
    assert_eq!(summary.stop_reason, Some(StopReason::DurationElapsed));
    assert_eq!(summary.workers, 2);
    assert!(!backend.table_exists(), "test table is dropped after the run");
}

#[tokio::test(start_paused = true)]
async fn insert_only_workload_on_healthy_backend() {
    let backend = FakeBackend::healthy();
    let orchestrator = Orchestrator::new(config::run(1, 2, 1.0), backend.connector());

    let summary = orchestrator.run().await.expect("run completes");

    assert_eq!(summary.selects_ok, 0);
    assert!(summary.inserts_ok > 0);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.reconnects, 0);
    assert_eq!(summary.outages, 0);
    assert_eq!(backend.inserted_rows(), summary.inserts_ok);
}

#[tokio::test(start_paused = true)]
async fn unreachable_backend_is_one_open_outage_for_the_whole_run() {
    let backend = FakeBackend::unreachable();
    let orchestrator = Orchestrator::new(config::run(2, 3, 0.5), backend.connector());

    let summary = orchestrator.run().await.expect("run completes");

    assert_eq!(summary.outages, 1);
    assert!(summary.outage_open_at_end);
    assert!(
        (summary.total_outage_secs - summary.elapsed_secs).abs() < 1e-6,
        "outage {}s vs elapsed {}s",
        summary.total_outage_secs,
        summary.elapsed_secs
    );
    assert_eq!(summary.inserts_ok, 0);
    assert_eq!(summary.selects_ok, 0);
    assert!(!backend.connect_attempts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_during_reconnect_backoff_still_cleans_up() {
    // Goes away at 1s and never comes back.
    let backend = FakeBackend::with_outages(vec![DownWindow::starting_at(Duration::from_secs(1))]);
    let orchestrator = Orchestrator::new(config::run(2, 3, 0.5), backend.connector());

    let summary = orchestrator.run().await.expect("run completes");

    assert_eq!(summary.elapsed_secs, 3.0, "backoff sleeps observe the stop signal");
    assert_eq!(summary.outages, 1);
    assert!(summary.outage_open_at_end);
    let statements = backend.statements();
    assert_eq!(
        statements.last().map(String::as_str),
        Some("DROP TABLE IF EXISTS \"failover_test\""),
        "cleanup attempted the drop"
    );
}

#[tokio::test(start_paused = true)]
async fn hung_backend_cannot_block_shutdown() {
    let backend = FakeBackend::healthy();
    let orchestrator = Orchestrator::new(config::run(2, 3, 0.5), backend.connector());
    let hang = backend.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        hang.hang_queries(true);
    });

    let start = Instant::now();
    let summary = orchestrator.run().await.expect("run completes");

    // Stop at 3s, join deadline 5s later, then the drop times out after another 5s.
    assert_eq!(summary.elapsed_secs, 8.0);
    assert_eq!(start.elapsed(), Duration::from_secs(13));
    assert!(backend.table_exists(), "drop could not complete on a hung backend");
}

#[tokio::test(start_paused = true)]
async fn interrupt_is_reported_as_stop_reason() {
    let backend = FakeBackend::healthy();
    let orchestrator = Orchestrator::new(config::run(3, 120, 0.6), backend.connector());
    let stop = orchestrator.stop_signal();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        stop.trigger(StopReason::Interrupted);
    });

    let summary = orchestrator.run().await.expect("run completes");

    assert_eq!(summary.stop_reason, Some(StopReason::Interrupted));
    assert_eq!(summary.elapsed_secs, 2.5);
    assert!(summary.inserts_ok + summary.selects_ok > 0);
    assert!(!backend.table_exists());
}

#[tokio::test(start_paused = true)]
async fn repeated_failovers_are_counted_separately() {
    let backend = FakeBackend::with_outages(vec![
        DownWindow::between(Duration::from_secs(2), Duration::from_secs(3)),
        DownWindow::between(Duration::from_secs(10), Duration::from_secs(12)),
    ]);
    let orchestrator = Orchestrator::new(config::run(2, 20, 0.6), backend.connector());

    let summary = orchestrator.run().await.expect("run completes");

    assert_eq!(summary.outages, 2);
    assert!(!summary.outage_open_at_end);
    assert!(summary.total_outage_secs >= 3.0);
}
