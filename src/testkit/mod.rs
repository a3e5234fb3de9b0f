//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`backend`] - In-process fake database: `FakeBackend`, `FakeConnector`,
//!   `FakeSession`, with scripted down windows.
//! - [`config`] - Canonical test configurations.

pub mod backend;
pub mod config;

pub use backend::{DownWindow, FakeBackend, FakeConnector, FakeSession};
