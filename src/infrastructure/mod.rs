//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing harness
//! logic.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading, validation and logging setup
pub mod config;
