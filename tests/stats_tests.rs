//! Shared bookkeeping under concurrency.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pgfailover::domain::{Operation, OutageTracker, StatsCollector};
use tokio::time::Instant;

#[test]
fn concurrent_increments_are_not_lost() {
    const WORKERS: u64 = 16;
    const PER_WORKER: u64 = 5_000;

    let stats = Arc::new(StatsCollector::new());
    let handles: Vec<_> = (0..WORKERS)
        .map(|i| {
            let stats = Arc::clone(&stats);
            thread::spawn(move || {
                for _ in 0..PER_WORKER {
                    if i % 2 == 0 {
                        stats.record_success(Operation::Insert);
                    } else {
                        stats.record_success(Operation::Select);
                    }
                    stats.record_error();
                    stats.record_reconnect();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker thread");
    }

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.inserts_ok, WORKERS / 2 * PER_WORKER);
    assert_eq!(snapshot.selects_ok, WORKERS / 2 * PER_WORKER);
    assert_eq!(snapshot.operations_ok(), WORKERS * PER_WORKER);
    assert_eq!(snapshot.errors, WORKERS * PER_WORKER);
    assert_eq!(snapshot.reconnects, WORKERS * PER_WORKER);
}

#[tokio::test(start_paused = true)]
async fn concurrent_failures_open_a_single_outage() {
    let tracker = Arc::new(OutageTracker::new());
    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move { tracker.record_failure() })
        })
        .collect();

    let mut opened = 0;
    for task in tasks {
        if task.await.expect("task") {
            opened += 1;
        }
    }

    assert_eq!(opened, 1);
    assert_eq!(tracker.snapshot().outages, 1);
}

#[test]
fn total_is_sum_of_open_close_pairs_including_final_flush() {
    let tracker = OutageTracker::new();
    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);

    // F F S S F S F F S
    tracker.record_failure_at(at(0));
    tracker.record_failure_at(at(300));
    tracker.record_success_at(at(1_000));
    tracker.record_success_at(at(1_500));
    tracker.record_failure_at(at(2_000));
    tracker.record_success_at(at(2_250));
    tracker.record_failure_at(at(4_000));
    tracker.record_failure_at(at(4_100));
    assert!(tracker.record_success_at(at(5_000)));

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.outages, 3);
    assert!((snapshot.total_outage_secs - 2.25).abs() < 1e-9);
    assert!(!snapshot.open);
}
