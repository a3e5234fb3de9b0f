//! Workload worker.
//!
//! Each worker owns its own [`ReconnectingHandle`] and loops until the stop
//! signal is observed: acquire a session, run one insert or select, update the
//! shared counters and outage state, then pause for a random jitter.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::context::RunContext;
use super::handle::ReconnectingHandle;
use super::schema::TableSql;
use crate::domain::{Operation, Workload};
use crate::error::Error;
use crate::port::{DbError, Session};

/// One workload task.
pub struct Worker {
    id: usize,
    handle: ReconnectingHandle,
    workload: Workload,
    sql: Arc<TableSql>,
    ctx: RunContext,
    rng: StdRng,
}

impl Worker {
    /// Build a worker. With a `seed`, the worker's RNG is seeded with
    /// `seed + id` so runs are reproducible.
    pub fn new(
        id: usize,
        handle: ReconnectingHandle,
        workload: Workload,
        sql: Arc<TableSql>,
        ctx: RunContext,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => StdRng::from_entropy(),
        };
        Self {
            id,
            handle,
            workload,
            sql,
            ctx,
            rng,
        }
    }

    /// Run until the stop signal is observed, then close the session.
    pub async fn run(mut self) {
        info!(worker = self.id, "Worker started");

        while !self.ctx.stop.is_set() {
            let session = match self.handle.acquire().await {
                Ok(session) => session,
                Err(Error::Stopped) => break,
                Err(e) => {
                    warn!(worker = self.id, error = %e, "Failed to acquire session");
                    break;
                }
            };

            let operation = self.workload.next_operation(&mut self.rng);
            match self.perform(session.as_ref(), operation).await {
                Ok(()) => {
                    self.ctx.stats.record_success(operation);
                    self.ctx.outage.record_success();
                }
                Err(e) if e.is_connectivity() => {
                    self.ctx.stats.record_error();
                    self.ctx.outage.record_failure();
                    warn!(
                        worker = self.id,
                        operation = %operation,
                        error = %e,
                        "Connectivity error, reconnecting"
                    );
                    session.close().await;
                    drop(session);
                    match self.handle.force_reconnect().await {
                        Ok(_) => self.ctx.stats.record_reconnect(),
                        Err(Error::Stopped) => break,
                        Err(e) => {
                            warn!(worker = self.id, error = %e, "Reconnect failed");
                            break;
                        }
                    }
                }
                Err(e) => {
                    self.ctx.stats.record_error();
                    warn!(
                        worker = self.id,
                        operation = %operation,
                        error = %e,
                        "Operation failed"
                    );
                }
            }

            let pause = self.workload.next_pause(&mut self.rng);
            if self.ctx.stop.sleep(pause).await {
                break;
            }
        }

        self.handle.close().await;
        debug!(worker = self.id, connects = self.handle.connects(), "Worker stopped");
    }

    async fn perform(&mut self, session: &dyn Session, operation: Operation) -> Result<(), DbError> {
        match operation {
            Operation::Insert => {
                let payload = self.workload.payload(&mut self.rng);
                session.execute(&self.sql.insert, &[payload.as_str()]).await?;
            }
            Operation::Select => {
                session.query(&self.sql.select, &[]).await?;
            }
        }
        Ok(())
    }
}
