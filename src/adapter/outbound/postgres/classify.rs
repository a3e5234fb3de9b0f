//! Driver error classification.
//!
//! Connectivity: the client is closed, the driver failed without a server
//! error (I/O, protocol, timeout), the SQLSTATE class points at the
//! connection or the server itself, or the server reported FATAL/PANIC.
//! Everything else is an application error.

use crate::port::{DbError, DbErrorKind};

/// SQLSTATE classes that mean the session or the server is unusable.
///
/// 08 connection exception, 40 transaction rollback, 53 insufficient
/// resources, 54 program limit exceeded, 55 object not in prerequisite state,
/// 57 operator intervention (includes 57014 query canceled and 57P01 admin
/// shutdown), 58 system error, XX internal error. These are the operational
/// errors of the libpq-based drivers.
const CONNECTIVITY_CLASSES: &[&str] = &["08", "40", "53", "54", "55", "57", "58", "XX"];

/// Classify a query-time driver error.
pub fn classify(error: &tokio_postgres::Error) -> DbError {
    let server = error.as_db_error();
    let kind = kind_of(
        error.is_closed(),
        server.map(|e| e.code().code()),
        server.map(|e| e.severity()),
    );
    let message = match server {
        Some(e) => e.message().to_string(),
        None => error.to_string(),
    };
    let classified = DbError::new(kind, message);
    match server {
        Some(e) => classified.with_code(e.code().code()),
        None => classified,
    }
}

/// Classify a failed connect attempt. Always retried, whatever the cause.
pub(super) fn classify_connect(error: &tokio_postgres::Error) -> DbError {
    let classified = DbError::connect(error.to_string());
    match error.as_db_error() {
        Some(e) => classified.with_code(e.code().code()),
        None => classified,
    }
}

fn kind_of(closed: bool, code: Option<&str>, severity: Option<&str>) -> DbErrorKind {
    if closed {
        return DbErrorKind::Connectivity;
    }
    let Some(code) = code else {
        return DbErrorKind::Connectivity;
    };
    if matches!(severity, Some("FATAL" | "PANIC")) {
        return DbErrorKind::Connectivity;
    }
    let class = code.get(..2).unwrap_or(code);
    if CONNECTIVITY_CLASSES.contains(&class) {
        DbErrorKind::Connectivity
    } else {
        DbErrorKind::Application
    }
}
