//! Database port: the opaque data-access boundary.
//!
//! The harness never touches a driver directly. It asks a [`Connector`] for a
//! [`Session`], runs SQL through it, and reacts to the [`DbErrorKind`] of any
//! failure. Classification into connect/connectivity/application failures is
//! the adapter's job.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Liveness query shared by sessions and the health probe.
pub const LIVENESS_QUERY: &str = "SELECT 1";

/// TCP keepalive settings applied to every new connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepaliveParams {
    pub idle: Duration,
    pub interval: Duration,
    pub retries: u32,
}

/// Immutable connection parameters, created once from configuration.
#[derive(Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub statement_timeout: Duration,
    pub connect_timeout: Duration,
    pub keepalive: KeepaliveParams,
    pub application_name: String,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("statement_timeout", &self.statement_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("keepalive", &self.keepalive)
            .field("application_name", &self.application_name)
            .finish()
    }
}

/// Failure category reported by the data-access layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    /// A connect attempt failed (timeout, refused, auth failure).
    Connect,
    /// The session is unusable: operational, interface or fatal server errors.
    Connectivity,
    /// Any other query failure. The session is assumed healthy.
    Application,
}

impl fmt::Display for DbErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect error"),
            Self::Connectivity => write!(f, "connectivity error"),
            Self::Application => write!(f, "application error"),
        }
    }
}

/// Classified database error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct DbError {
    kind: DbErrorKind,
    message: String,
    code: Option<String>,
}

impl DbError {
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Connect, message)
    }

    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Connectivity, message)
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Application, message)
    }

    /// Attach the server's SQLSTATE code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn kind(&self) -> DbErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// True when the failure is evidence that the session (or the backend) is gone.
    pub fn is_connectivity(&self) -> bool {
        matches!(self.kind, DbErrorKind::Connect | DbErrorKind::Connectivity)
    }
}

/// A single logical connection to the database.
///
/// Statements run in autocommit mode. Parameters are positional text values
/// bound to `$1`, `$2`, ...
#[async_trait]
pub trait Session: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    async fn execute(&self, sql: &str, params: &[&str]) -> Result<u64, DbError>;

    /// Run a query and return the number of rows it produced.
    async fn query(&self, sql: &str, params: &[&str]) -> Result<usize, DbError>;

    /// Execute one or more parameterless statements separated by semicolons.
    async fn batch_execute(&self, sql: &str) -> Result<(), DbError>;

    /// Issue a trivial round trip. Any error reads as "not alive".
    async fn is_alive(&self) -> bool {
        !self.is_closed() && self.query(LIVENESS_QUERY, &[]).await.is_ok()
    }

    /// Close the session. Idempotent and infallible.
    async fn close(&self);

    /// Whether the session is known to be closed.
    fn is_closed(&self) -> bool;
}

/// Opens new sessions against the backend.
///
/// Implementations apply session-level configuration (statement timeout,
/// message verbosity) before handing the session out.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn Session>, DbError>;
}
