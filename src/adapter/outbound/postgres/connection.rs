//! Connection establishment.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_postgres::NoTls;
use tracing::{debug, warn};

use super::classify::classify_connect;
use super::session::PgSession;
use crate::port::{ConnectionParams, Connector, DbError, Session};

/// Opens autocommit sessions with the configured timeouts and keepalives.
#[derive(Debug, Clone)]
pub struct PgConnector {
    params: ConnectionParams,
}

impl PgConnector {
    pub fn new(params: ConnectionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    fn driver_config(&self) -> tokio_postgres::Config {
        let params = &self.params;
        let mut config = tokio_postgres::Config::new();
        config
            .host(&params.host)
            .port(params.port)
            .dbname(&params.database)
            .user(&params.user)
            .application_name(&params.application_name)
            .connect_timeout(params.connect_timeout)
            .keepalives(true)
            .keepalives_idle(params.keepalive.idle)
            .keepalives_interval(params.keepalive.interval)
            .keepalives_retries(params.keepalive.retries);
        if !params.password.is_empty() {
            config.password(&params.password);
        }
        config
    }

    /// Connect and apply the per-session settings.
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] of kind `Connect` if the server cannot be
    /// reached, rejects the login, or fails the session setup.
    pub async fn connect_session(&self) -> Result<PgSession, DbError> {
        let (client, connection) = self
            .driver_config()
            .connect(NoTls)
            .await
            .map_err(|e| classify_connect(&e))?;

        let host = self.params.host.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(host = %host, error = %e, "Connection task ended with error");
            }
        });
        let session = PgSession::new(client, task);

        let setup = format!(
            "SET statement_timeout = {}; SET client_min_messages = 'warning'",
            self.params.statement_timeout.as_millis()
        );
        if let Err(e) = session.client().batch_execute(&setup).await {
            session.close().await;
            return Err(classify_connect(&e));
        }

        debug!(
            host = %self.params.host,
            port = self.params.port,
            database = %self.params.database,
            "Session established"
        );
        Ok(session)
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self) -> Result<Arc<dyn Session>, DbError> {
        let session = self.connect_session().await?;
        Ok(Arc::new(session))
    }
}
