//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! The harness core talks to the database exclusively through the
//! outbound database port, so the driver can be swapped for an
//! in-process fake in tests.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  handle/worker/probe/   │
//!                    │      orchestrator       │
//!                    └────────────┬────────────┘
//!                                 │
//!                                 ▼
//!                    ┌─────────────────────────┐
//!                    │  Connector / Session    │
//!                    └────────────┬────────────┘
//!                                 │
//!                 ┌───────────────┴───────────────┐
//!                 ▼                               ▼
//!          ┌─────────────┐                 ┌─────────────┐
//!          │  Postgres   │                 │   Testkit   │
//!          │   Adapter   │                 │   Backend   │
//!          └─────────────┘                 └─────────────┘
//! ```

pub mod outbound;

pub use outbound::database::{
    ConnectionParams, Connector, DbError, DbErrorKind, KeepaliveParams, Session, LIVENESS_QUERY,
};
