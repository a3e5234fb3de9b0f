//! Driver-free harness logic: backoff, outage and stats bookkeeping,
//! the stop signal and the workload mix.

mod backoff;
mod outage;
mod stats;
mod stop;
mod summary;
mod workload;

pub use backoff::Backoff;
pub use outage::{OutageSnapshot, OutageTracker};
pub use stats::{StatsCollector, StatsSnapshot};
pub use stop::{StopReason, StopSignal};
pub use summary::RunSummary;
pub use workload::{Operation, Workload};
