//! Per-run shared state handed to every task.

use std::sync::Arc;

use crate::domain::{OutageTracker, StatsCollector, StopSignal};

/// Counters, outage tracking and the stop signal for one run.
///
/// Constructed once per run and shared by cloning; nothing here is global.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub stats: Arc<StatsCollector>,
    pub outage: Arc<OutageTracker>,
    pub stop: StopSignal,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }
}
