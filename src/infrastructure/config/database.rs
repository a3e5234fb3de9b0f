//! Database connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::port::{ConnectionParams, KeepaliveParams};

/// Placeholder shown instead of a configured password.
pub const REDACTED: &str = "********";

/// Target pooler/proxy and session settings.
#[derive(Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_user")]
    pub user: String,
    /// Prefer `PGPASSWORD` over storing this in the file.
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_application_name")]
    pub application_name: String,
    #[serde(default)]
    pub keepalive: KeepaliveConfig,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &REDACTED)
            .field("statement_timeout_ms", &self.statement_timeout_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("application_name", &self.application_name)
            .field("keepalive", &self.keepalive)
            .finish()
    }
}

/// TCP keepalive settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeepaliveConfig {
    #[serde(default = "default_keepalive_idle_secs")]
    pub idle_secs: u64,
    #[serde(default = "default_keepalive_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_keepalive_retries")]
    pub retries: u32,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

const fn default_port() -> u16 {
    9999
}

fn default_name() -> String {
    "postgres".into()
}

fn default_user() -> String {
    "postgres".into()
}

const fn default_statement_timeout_ms() -> u64 {
    5000
}

const fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_application_name() -> String {
    "pgpool_failover_tester".into()
}

const fn default_keepalive_idle_secs() -> u64 {
    5
}

const fn default_keepalive_interval_secs() -> u64 {
    5
}

const fn default_keepalive_retries() -> u32 {
    3
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            idle_secs: default_keepalive_idle_secs(),
            interval_secs: default_keepalive_interval_secs(),
            retries: default_keepalive_retries(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            name: default_name(),
            user: default_user(),
            password: String::new(),
            statement_timeout_ms: default_statement_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            application_name: default_application_name(),
            keepalive: KeepaliveConfig::default(),
        }
    }
}

impl DatabaseConfig {
    /// Build the immutable connection parameters used for every session.
    #[must_use]
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            host: self.host.clone(),
            port: self.port,
            database: self.name.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            statement_timeout: Duration::from_millis(self.statement_timeout_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            keepalive: KeepaliveParams {
                idle: Duration::from_secs(self.keepalive.idle_secs),
                interval: Duration::from_secs(self.keepalive.interval_secs),
                retries: self.keepalive.retries,
            },
            application_name: self.application_name.clone(),
        }
    }

    /// `host:port/database` for logs and operator output.
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.name)
    }
}
