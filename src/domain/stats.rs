//! Workload counters shared by all workers and the probe.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::workload::Operation;

/// Race-free operation counters.
///
/// All counters are monotonically non-decreasing.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inserts_ok: AtomicU64,
    selects_ok: AtomicU64,
    errors: AtomicU64,
    reconnects: AtomicU64,
}

/// Counter values read at a single point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub inserts_ok: u64,
    pub selects_ok: u64,
    pub errors: u64,
    pub reconnects: u64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_insert(&self) {
        self.inserts_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_select(&self) {
        self.selects_ok.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a successful workload operation of the given kind.
    pub fn record_success(&self, operation: Operation) {
        match operation {
            Operation::Insert => self.record_insert(),
            Operation::Select => self.record_select(),
        }
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            inserts_ok: self.inserts_ok.load(Ordering::Relaxed),
            selects_ok: self.selects_ok.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Successful workload operations of either kind.
    #[must_use]
    pub fn operations_ok(&self) -> u64 {
        self.inserts_ok + self.selects_ok
    }
}
