//! Workload, probe and shutdown configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::Workload;

/// Worker count, run length and operation mix.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkloadConfig {
    /// Test table name. Dropped at the end of the run.
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    /// Probability of an insert; otherwise a select.
    #[serde(default = "default_insert_ratio")]
    pub insert_ratio: f64,
    #[serde(default = "default_sleep_min_ms")]
    pub sleep_min_ms: u64,
    #[serde(default = "default_sleep_max_ms")]
    pub sleep_max_ms: u64,
    #[serde(default = "default_payload_len")]
    pub payload_len: usize,
    /// Seed for reproducible operation mixes. Random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_table() -> String {
    "failover_test".into()
}

const fn default_workers() -> usize {
    4
}

const fn default_duration_secs() -> u64 {
    120
}

const fn default_insert_ratio() -> f64 {
    0.6
}

const fn default_sleep_min_ms() -> u64 {
    50
}

const fn default_sleep_max_ms() -> u64 {
    150
}

const fn default_payload_len() -> usize {
    24
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            workers: default_workers(),
            duration_secs: default_duration_secs(),
            insert_ratio: default_insert_ratio(),
            sleep_min_ms: default_sleep_min_ms(),
            sleep_max_ms: default_sleep_max_ms(),
            payload_len: default_payload_len(),
            seed: None,
        }
    }
}

impl WorkloadConfig {
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Operation mix and pacing for the workers.
    #[must_use]
    pub fn workload(&self) -> Workload {
        Workload::new(
            self.insert_ratio,
            Duration::from_millis(self.sleep_min_ms),
            Duration::from_millis(self.sleep_max_ms),
            self.payload_len,
        )
    }
}

/// Health probe cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_interval_ms")]
    pub interval_ms: u64,
}

const fn default_probe_interval_ms() -> u64 {
    1000
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_probe_interval_ms(),
        }
    }
}

impl ProbeConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Bounds on how long teardown may wait for tasks and cleanup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShutdownConfig {
    #[serde(default = "default_join_timeout_secs")]
    pub join_timeout_secs: u64,
}

const fn default_join_timeout_secs() -> u64 {
    5
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            join_timeout_secs: default_join_timeout_secs(),
        }
    }
}

impl ShutdownConfig {
    #[must_use]
    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }
}
