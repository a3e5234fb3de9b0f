//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all harness settings.
//! Configuration comes from an optional TOML file, then libpq-style
//! environment variables (`PGHOST`, `PGPORT`, `PGDATABASE`, `PGUSER`,
//! `PGPASSWORD`), then command-line overrides applied by the CLI.
//!
//! # Example
//!
//! ```no_run
//! use pgfailover::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::load("pgfailover.toml")?;
//!     config.apply_env(|key| std::env::var(key).ok())?;
//!     config.validate()?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use super::database::{DatabaseConfig, REDACTED};
use super::logging::LoggingConfig;
use super::reconnection::ReconnectionConfig;
use super::workload::{ProbeConfig, ShutdownConfig, WorkloadConfig};
use crate::error::{ConfigError, Result};

/// Main harness configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Target pooler/proxy and session settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Worker count, run length and operation mix.
    #[serde(default)]
    pub workload: WorkloadConfig,

    /// Health probe cadence.
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Backoff between reconnect attempts.
    #[serde(default)]
    pub reconnection: ReconnectionConfig,

    /// Teardown bounds.
    #[serde(default)]
    pub shutdown: ShutdownConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Longest accepted run: one week.
const MAX_DURATION_SECS: u64 = 7 * 24 * 60 * 60;
/// Longest accepted pause, probe interval, backoff delay or session timeout: one hour.
const MAX_INTERVAL_MS: u64 = 60 * 60 * 1000;
/// Longest accepted join and cleanup bound.
const MAX_JOIN_TIMEOUT_SECS: u64 = 60 * 60;

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Values are not validated here: environment and command-line overrides
    /// still apply, so call [`validate`](Self::validate) on the merged result.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::Parse)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load from `path` when given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply libpq-style environment variables on top of the current values.
    ///
    /// `lookup` abstracts the environment so tests need not mutate the
    /// process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("PGHOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("PGPORT") {
            self.database.port = port
                .trim()
                .parse()
                .map_err(|_| invalid("PGPORT", "must be a port number"))?;
        }
        if let Some(name) = lookup("PGDATABASE") {
            self.database.name = name;
        }
        if let Some(user) = lookup("PGUSER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("PGPASSWORD") {
            self.database.password = password;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are present and values are within
    /// acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if self.database.host.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "host" }.into());
        }
        if self.database.port == 0 {
            return Err(invalid("port", "must be greater than 0"));
        }
        if self.database.name.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        if self.database.user.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "user" }.into());
        }
        if self.database.connect_timeout_ms == 0 {
            return Err(invalid("connect_timeout_ms", "must be greater than 0"));
        }
        if self.database.connect_timeout_ms > MAX_INTERVAL_MS {
            return Err(invalid("connect_timeout_ms", "must be at most one hour"));
        }
        if self.database.statement_timeout_ms > MAX_INTERVAL_MS {
            return Err(invalid("statement_timeout_ms", "must be at most one hour"));
        }

        let workload = &self.workload;
        if workload.table.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "table" }.into());
        }
        if workload.workers == 0 {
            return Err(invalid("workers", "must be greater than 0"));
        }
        if workload.duration_secs == 0 {
            return Err(invalid("duration_secs", "must be greater than 0"));
        }
        if workload.duration_secs > MAX_DURATION_SECS {
            return Err(invalid("duration_secs", "must be at most one week"));
        }
        if !(0.0..=1.0).contains(&workload.insert_ratio) {
            return Err(invalid("insert_ratio", "must be between 0 and 1"));
        }
        if workload.sleep_min_ms > workload.sleep_max_ms {
            return Err(invalid("sleep_min_ms", "must be <= sleep_max_ms"));
        }
        if workload.sleep_max_ms > MAX_INTERVAL_MS {
            return Err(invalid("sleep_max_ms", "must be at most one hour"));
        }
        if workload.payload_len == 0 {
            return Err(invalid("payload_len", "must be greater than 0"));
        }

        if self.probe.interval_ms == 0 {
            return Err(invalid("interval_ms", "must be greater than 0"));
        }
        if self.probe.interval_ms > MAX_INTERVAL_MS {
            return Err(invalid("interval_ms", "must be at most one hour"));
        }

        if self.reconnection.initial_delay_ms == 0 {
            return Err(invalid("initial_delay_ms", "must be greater than 0"));
        }
        if self.reconnection.max_delay_ms < self.reconnection.initial_delay_ms {
            return Err(invalid("max_delay_ms", "must be >= initial_delay_ms"));
        }
        if self.reconnection.max_delay_ms > MAX_INTERVAL_MS {
            return Err(invalid("max_delay_ms", "must be at most one hour"));
        }
        if self.shutdown.join_timeout_secs > MAX_JOIN_TIMEOUT_SECS {
            return Err(invalid("join_timeout_secs", "must be at most one hour"));
        }
        let multiplier = self.reconnection.backoff_multiplier;
        if multiplier.is_nan() || multiplier < 1.0 {
            return Err(invalid("backoff_multiplier", "must be >= 1.0"));
        }

        if EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(invalid("level", "must be a valid log level or filter"));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(invalid("format", "must be \"pretty\" or \"json\""));
        }
        Ok(())
    }

    /// Copy of this configuration safe to print.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.database.password.is_empty() {
            config.database.password = REDACTED.to_string();
        }
        config
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
