//! Configuration loading, validation and logging initialization.

pub mod database;
pub mod logging;
pub mod reconnection;
pub mod settings;
pub mod workload;

pub use database::{DatabaseConfig, KeepaliveConfig};
pub use logging::LoggingConfig;
pub use reconnection::ReconnectionConfig;
pub use settings::Config;
pub use workload::{ProbeConfig, ShutdownConfig, WorkloadConfig};
