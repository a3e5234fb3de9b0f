//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use crate::infrastructure::config::{Config, ReconnectionConfig};

/// Reconnection config with the production schedule (500 ms doubling to 5 s).
pub fn reconnection() -> ReconnectionConfig {
    ReconnectionConfig::default()
}

/// Run configuration with a fixed seed and the given shape.
///
/// Everything else keeps production defaults (1 s probe cadence,
/// 50..150 ms jitter, 5 s join timeout), which tests rely on when asserting
/// outage durations under paused time.
pub fn run(workers: usize, duration_secs: u64, insert_ratio: f64) -> Config {
    let mut config = Config::default();
    config.workload.workers = workers;
    config.workload.duration_secs = duration_secs;
    config.workload.insert_ratio = insert_ratio;
    config.workload.seed = Some(7);
    config
}
