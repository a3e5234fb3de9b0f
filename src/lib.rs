//! pgfailover - failover resilience harness for PostgreSQL poolers.
//!
//! Drives a concurrent insert/select workload through a pooler or proxy (for
//! example pgpool) while the backend fails over, and measures how the client
//! side experiences it: how many operations succeeded, how many failed, how
//! often sessions had to be re-established, and how many distinct outages
//! occurred and for how long.
//!
//! # Architecture
//!
//! - [`domain`] - Driver-free bookkeeping: backoff, outage tracking, stats,
//!   the stop signal and the randomized workload mix
//! - [`port`] - The database boundary (`Connector`, `Session`, `DbError`)
//! - [`application`] - Reconnecting handle, workers, health probe and the
//!   orchestrator that runs them
//! - [`adapter`] - `tokio-postgres` implementation of the port and the CLI
//! - [`infrastructure`] - Configuration and logging
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pgfailover::adapter::outbound::postgres::PgConnector;
//! use pgfailover::application::Orchestrator;
//! use pgfailover::infrastructure::config::Config;
//!
//! # async fn run() -> pgfailover::error::Result<()> {
//! let config = Config::default();
//! let connector = Arc::new(PgConnector::new(config.database.connection_params()));
//! let summary = Orchestrator::new(config, connector).run().await?;
//! println!("{} outages", summary.outages);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
