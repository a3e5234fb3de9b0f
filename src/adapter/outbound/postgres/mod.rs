//! PostgreSQL adapter over `tokio-postgres`.
//!
//! Implements the [`Connector`](crate::port::Connector) and
//! [`Session`](crate::port::Session) ports for a real server or a pooler in
//! front of one, and classifies driver errors into connectivity and
//! application failures.

mod classify;
mod connection;
mod session;

pub use classify::classify;
pub use connection::PgConnector;
pub use session::PgSession;
