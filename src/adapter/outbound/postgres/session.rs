//! One autocommit session.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::Client;

use super::classify::classify;
use crate::port::{DbError, Session};

/// Client plus the task driving its connection.
pub struct PgSession {
    client: Client,
    connection: JoinHandle<()>,
    closed: AtomicBool,
}

impl PgSession {
    pub(super) fn new(client: Client, connection: JoinHandle<()>) -> Self {
        Self {
            client,
            connection,
            closed: AtomicBool::new(false),
        }
    }

    pub(super) fn client(&self) -> &Client {
        &self.client
    }

    /// `server_version` as reported by the backend (or the pooler).
    ///
    /// # Errors
    ///
    /// Returns the classified driver error if the query fails.
    pub async fn server_version(&self) -> Result<String, DbError> {
        let row = self
            .client
            .query_one("SHOW server_version", &[])
            .await
            .map_err(|e| classify(&e))?;
        row.try_get::<_, String>(0).map_err(|e| classify(&e))
    }

    fn closed_error() -> DbError {
        DbError::connectivity("session is closed")
    }
}

fn to_sql<'a>(params: &'a [&'a str]) -> Vec<&'a (dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

#[async_trait]
impl Session for PgSession {
    async fn execute(&self, sql: &str, params: &[&str]) -> Result<u64, DbError> {
        if self.is_closed() {
            return Err(Self::closed_error());
        }
        self.client
            .execute(sql, &to_sql(params))
            .await
            .map_err(|e| classify(&e))
    }

    async fn query(&self, sql: &str, params: &[&str]) -> Result<usize, DbError> {
        if self.is_closed() {
            return Err(Self::closed_error());
        }
        self.client
            .query(sql, &to_sql(params))
            .await
            .map(|rows| rows.len())
            .map_err(|e| classify(&e))
    }

    async fn batch_execute(&self, sql: &str) -> Result<(), DbError> {
        if self.is_closed() {
            return Err(Self::closed_error());
        }
        self.client.batch_execute(sql).await.map_err(|e| classify(&e))
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.connection.abort();
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.client.is_closed()
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        self.connection.abort();
    }
}

impl std::fmt::Debug for PgSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSession")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
