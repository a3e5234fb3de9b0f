//! Application services (use cases).
//!
//! The harness proper: a self-healing session handle, the workload workers,
//! the health probe and the orchestrator that runs them against any
//! [`Connector`](crate::port::Connector).

pub mod context;
pub mod handle;
pub mod orchestrator;
pub mod probe;
pub mod schema;
pub mod worker;

pub use context::RunContext;
pub use handle::ReconnectingHandle;
pub use orchestrator::Orchestrator;
pub use probe::HealthProbe;
pub use schema::TableSql;
pub use worker::Worker;
