//! Test table DDL and workload statements.

use crate::port::{DbError, Session};

/// Quote an identifier for PostgreSQL, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Statements for one test table, quoted once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSql {
    table: String,
    pub create: String,
    pub insert: String,
    pub select: String,
    pub drop: String,
}

impl TableSql {
    pub fn new(table: &str) -> Self {
        let quoted = quote_ident(table);
        let index = quote_ident(&format!("{table}_ts_idx"));
        Self {
            table: table.to_string(),
            create: format!(
                "CREATE TABLE IF NOT EXISTS {quoted} (\n\
                 \x20   id BIGSERIAL PRIMARY KEY,\n\
                 \x20   ts TIMESTAMPTZ NOT NULL DEFAULT now(),\n\
                 \x20   payload TEXT NOT NULL\n\
                 );\n\
                 CREATE INDEX IF NOT EXISTS {index} ON {quoted} (ts DESC);"
            ),
            insert: format!("INSERT INTO {quoted} (payload) VALUES ($1)"),
            select: format!("SELECT count(*) AS cnt, max(ts) AS last_ts FROM {quoted}"),
            drop: format!("DROP TABLE IF EXISTS {quoted}"),
        }
    }

    /// Unquoted table name.
    pub fn table(&self) -> &str {
        &self.table
    }
}

/// Create the test table and its index if they do not exist.
pub async fn ensure_table(session: &dyn Session, sql: &TableSql) -> Result<(), DbError> {
    session.batch_execute(&sql.create).await
}

/// Drop the test table if it exists.
pub async fn drop_table(session: &dyn Session, sql: &TableSql) -> Result<(), DbError> {
    session.batch_execute(&sql.drop).await
}
