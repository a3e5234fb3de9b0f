//! Outage tracking shared by every worker and the health probe.
//!
//! An outage opens on the first connectivity failure observed while no outage
//! is open, and closes on the first subsequent success. Repeated failures
//! while open do not open a second outage.

use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct OutageState {
    /// Set iff an outage is currently open.
    started_at: Option<Instant>,
    count: u64,
    total: Duration,
}

/// Point-in-time view of the outage state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutageSnapshot {
    pub outages: u64,
    pub total_outage_secs: f64,
    pub open: bool,
}

/// Thread-safe outage bookkeeping.
#[derive(Debug, Default)]
pub struct OutageTracker {
    state: Mutex<OutageState>,
}

impl OutageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the open outage, if any. Returns true when an outage was closed.
    pub fn record_success(&self) -> bool {
        self.record_success_at(Instant::now())
    }

    /// Open an outage if none is open. Returns true when a new outage opened.
    pub fn record_failure(&self) -> bool {
        self.record_failure_at(Instant::now())
    }

    pub fn record_success_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock();
        let Some(started_at) = state.started_at.take() else {
            return false;
        };
        let elapsed = now.saturating_duration_since(started_at);
        state.total += elapsed;
        info!(
            outage = state.count,
            duration_secs = elapsed.as_secs_f64(),
            "Connectivity restored"
        );
        true
    }

    pub fn record_failure_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock();
        if state.started_at.is_some() {
            return false;
        }
        state.started_at = Some(now);
        state.count += 1;
        warn!(outage = state.count, "Connectivity lost, outage started");
        true
    }

    /// Close any still-open outage at end of run.
    ///
    /// Returns true when an outage was still open.
    pub fn flush(&self) -> bool {
        self.record_success()
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().started_at.is_some()
    }

    /// Accumulated downtime of closed outages.
    pub fn total(&self) -> Duration {
        self.state.lock().total
    }

    pub fn snapshot(&self) -> OutageSnapshot {
        let state = self.state.lock();
        OutageSnapshot {
            outages: state.count,
            total_outage_secs: state.total.as_secs_f64(),
            open: state.started_at.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn success_without_open_outage_is_noop() {
        let tracker = OutageTracker::new();
        assert!(!tracker.record_success());

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.outages, 0);
        assert_eq!(snapshot.total_outage_secs, 0.0);
        assert!(!snapshot.open);
    }

    #[test]
    fn repeated_failures_open_one_outage() {
        let tracker = OutageTracker::new();
        let t0 = Instant::now();

        assert!(tracker.record_failure_at(t0));
        assert!(!tracker.record_failure_at(t0 + secs(1)));
        assert!(!tracker.record_failure_at(t0 + secs(2)));

        assert_eq!(tracker.snapshot().outages, 1);
        assert!(tracker.is_open());
    }

    #[test]
    fn close_accumulates_from_first_failure() {
        let tracker = OutageTracker::new();
        let t0 = Instant::now();

        tracker.record_failure_at(t0);
        tracker.record_failure_at(t0 + secs(2));
        assert!(tracker.record_success_at(t0 + secs(3)));

        assert_eq!(tracker.total(), secs(3));
        assert!(!tracker.is_open());
    }

    #[test]
    fn total_is_sum_of_open_close_pairs() {
        let tracker = OutageTracker::new();
        let t0 = Instant::now();

        // (fail at, succeed at) pairs interleaved with noise
        tracker.record_success_at(t0);
        tracker.record_failure_at(t0 + secs(1));
        tracker.record_success_at(t0 + secs(4));
        tracker.record_success_at(t0 + secs(5));
        tracker.record_failure_at(t0 + secs(10));
        tracker.record_failure_at(t0 + secs(11));
        tracker.record_success_at(t0 + secs(12));
        tracker.record_failure_at(t0 + secs(20));
        tracker.record_success_at(t0 + secs(27));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.outages, 3);
        assert_eq!(tracker.total(), secs(3 + 2 + 7));
        assert!(!snapshot.open);
    }

    #[test]
    fn open_outage_does_not_contribute_until_closed() {
        let tracker = OutageTracker::new();
        let t0 = Instant::now();

        tracker.record_failure_at(t0);
        assert_eq!(tracker.total(), Duration::ZERO);

        tracker.record_success_at(t0 + secs(4));
        assert_eq!(tracker.total(), secs(4));
    }

    #[test]
    fn success_before_start_does_not_shrink_total() {
        let tracker = OutageTracker::new();
        let t0 = Instant::now() + secs(10);

        tracker.record_failure_at(t0);
        tracker.record_success_at(t0 - secs(5));

        assert_eq!(tracker.total(), Duration::ZERO);
        assert!(!tracker.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn flush_closes_outage_still_open_at_end() {
        let tracker = OutageTracker::new();
        tracker.record_failure();

        tokio::time::sleep(secs(3)).await;
        assert!(tracker.snapshot().open);

        assert!(tracker.flush());
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.outages, 1);
        assert!(!snapshot.open);
        assert!((snapshot.total_outage_secs - 3.0).abs() < 1e-6);

        assert!(!tracker.flush());
    }
}
