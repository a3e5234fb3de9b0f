//! End-of-run summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::outage::OutageSnapshot;
use super::stats::StatsSnapshot;
use super::stop::StopReason;

/// Aggregate counters reported once the run has finished.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub inserts_ok: u64,
    pub selects_ok: u64,
    pub errors: u64,
    pub reconnects: u64,
    pub outages: u64,
    pub total_outage_secs: f64,
    /// An outage was still open when the run ended and was closed by the final flush.
    pub outage_open_at_end: bool,
    pub stop_reason: Option<StopReason>,
    pub workers: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_secs: f64,
}

impl RunSummary {
    pub fn new(
        stats: StatsSnapshot,
        outage: OutageSnapshot,
        outage_open_at_end: bool,
        stop_reason: Option<StopReason>,
        workers: usize,
        started_at: DateTime<Utc>,
        elapsed_secs: f64,
    ) -> Self {
        Self {
            inserts_ok: stats.inserts_ok,
            selects_ok: stats.selects_ok,
            errors: stats.errors,
            reconnects: stats.reconnects,
            outages: outage.outages,
            total_outage_secs: outage.total_outage_secs,
            outage_open_at_end,
            stop_reason,
            workers,
            started_at,
            finished_at: Utc::now(),
            elapsed_secs,
        }
    }

    /// Share of the run spent outside an outage, in percent.
    #[must_use]
    pub fn availability_pct(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 100.0;
        }
        let up = (self.elapsed_secs - self.total_outage_secs).max(0.0);
        up / self.elapsed_secs * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(elapsed: f64, outage: f64) -> RunSummary {
        RunSummary::new(
            StatsSnapshot {
                inserts_ok: 3,
                selects_ok: 2,
                errors: 1,
                reconnects: 1,
            },
            OutageSnapshot {
                outages: 1,
                total_outage_secs: outage,
                open: false,
            },
            false,
            Some(StopReason::DurationElapsed),
            2,
            Utc::now(),
            elapsed,
        )
    }

    #[test]
    fn copies_counters() {
        let summary = summary(10.0, 3.0);
        assert_eq!(summary.inserts_ok, 3);
        assert_eq!(summary.selects_ok, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.reconnects, 1);
        assert_eq!(summary.outages, 1);
        assert_eq!(summary.workers, 2);
    }

    #[test]
    fn availability_reflects_outage_share() {
        assert!((summary(10.0, 3.0).availability_pct() - 70.0).abs() < 1e-9);
        assert!((summary(0.0, 0.0).availability_pct() - 100.0).abs() < 1e-9);
        assert!(summary(3.0, 3.5).availability_pct().abs() < 1e-9);
    }

    #[test]
    fn serializes_stop_reason_in_snake_case() {
        let json = serde_json::to_value(summary(1.0, 0.0)).unwrap();
        assert_eq!(json["stop_reason"], "duration_elapsed");
        assert_eq!(json["inserts_ok"], 3);
    }
}
