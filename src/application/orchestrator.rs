//! Run lifecycle.
//!
//! Bootstraps the test table, starts the workers and the health probe, waits
//! for the run duration or an external stop, joins everything with a bounded
//! timeout and then cleans up best-effort.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::context::RunContext;
use super::handle::ReconnectingHandle;
use super::probe::HealthProbe;
use super::schema::{self, TableSql};
use super::worker::Worker;
use crate::domain::{RunSummary, StopReason, StopSignal};
use crate::error::{Error, Result};
use crate::infrastructure::config::Config;
use crate::port::{Connector, DbError};

/// Name of the handle used for schema setup and teardown.
const BOOTSTRAP: &str = "bootstrap";

/// Drives one harness run against a [`Connector`].
pub struct Orchestrator {
    config: Config,
    connector: Arc<dyn Connector>,
    ctx: RunContext,
}

impl Orchestrator {
    pub fn new(config: Config, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            ctx: RunContext::new(),
        }
    }

    /// Signal that ends the run when triggered. Cloning is cheap.
    pub fn stop_signal(&self) -> StopSignal {
        self.ctx.stop.clone()
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Run the harness to completion.
    ///
    /// Connectivity problems never fail the run; they show up in the summary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the test table could not be created for a
    /// reason other than lost connectivity. Cleanup still runs first.
    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let start = Instant::now();
        let stop = self.ctx.stop.clone();
        let sql = Arc::new(TableSql::new(&self.config.workload.table));

        info!(
            table = sql.table(),
            workers = self.config.workload.workers,
            duration_secs = self.config.workload.duration_secs,
            insert_ratio = self.config.workload.insert_ratio,
            "Starting failover run"
        );

        let timer = self.spawn_timer();

        let bootstrap = self.handle(BOOTSTRAP);
        let mut setup_error = None;
        match self.setup_schema(&bootstrap, &sql).await {
            Ok(()) => {}
            Err(Error::Stopped) => {
                warn!("Stopped before the test table could be created");
            }
            Err(e) => {
                error!(error = %e, "Schema setup failed, aborting run");
                stop.trigger(StopReason::SetupFailed);
                setup_error = Some(e);
            }
        }

        let tasks = if stop.is_set() {
            Vec::new()
        } else {
            self.spawn_tasks(&sql)
        };

        stop.stopped().await;
        info!(reason = ?stop.reason(), "Stop signal set, joining tasks");
        timer.abort();

        self.join_tasks(tasks).await;

        let elapsed = start.elapsed();
        let outage_open_at_end = self.ctx.outage.flush();
        if outage_open_at_end {
            warn!("Run ended during an outage");
        }
        let summary = RunSummary::new(
            self.ctx.stats.snapshot(),
            self.ctx.outage.snapshot(),
            outage_open_at_end,
            stop.reason(),
            self.config.workload.workers,
            started_at,
            elapsed.as_secs_f64(),
        );
        info!(
            inserts_ok = summary.inserts_ok,
            selects_ok = summary.selects_ok,
            errors = summary.errors,
            reconnects = summary.reconnects,
            outages = summary.outages,
            total_outage_secs = summary.total_outage_secs,
            "Run finished"
        );

        self.teardown(&bootstrap, &sql).await;

        match setup_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    fn handle(&self, name: impl Into<String>) -> ReconnectingHandle {
        ReconnectingHandle::new(
            name,
            Arc::clone(&self.connector),
            self.config.reconnection.clone(),
            self.ctx.stop.clone(),
        )
        .with_outage_tracker(Arc::clone(&self.ctx.outage))
    }

    fn spawn_timer(&self) -> JoinHandle<()> {
        let stop = self.ctx.stop.clone();
        let duration = self.config.workload.duration();
        tokio::spawn(async move {
            if !stop.sleep(duration).await && stop.trigger(StopReason::DurationElapsed) {
                info!(duration_secs = duration.as_secs(), "Run duration elapsed");
            }
        })
    }

    /// Create the test table, retrying through connectivity loss.
    async fn setup_schema(&self, bootstrap: &ReconnectingHandle, sql: &TableSql) -> Result<()> {
        let setup = async {
            loop {
                let session = bootstrap.acquire().await?;
                match schema::ensure_table(session.as_ref(), sql).await {
                    Ok(()) => {
                        self.ctx.outage.record_success();
                        info!(table = sql.table(), "Test table ready");
                        return Ok::<(), Error>(());
                    }
                    Err(e) if e.is_connectivity() => {
                        self.ctx.outage.record_failure();
                        warn!(error = %e, "Lost connection during schema setup, retrying");
                        bootstrap.force_reconnect().await?;
                    }
                    Err(e) => return Err(Error::Schema(e.to_string())),
                }
            }
        };

        tokio::select! {
            result = setup => result,
            () = self.ctx.stop.stopped() => Err(Error::Stopped),
        }
    }

    fn spawn_tasks(&self, sql: &Arc<TableSql>) -> Vec<(String, JoinHandle<()>)> {
        let workload = self.config.workload.workload();
        let mut tasks = Vec::with_capacity(self.config.workload.workers + 1);

        for id in 0..self.config.workload.workers {
            let name = format!("worker-{id}");
            let worker = Worker::new(
                id,
                self.handle(name.clone()),
                workload.clone(),
                Arc::clone(sql),
                self.ctx.clone(),
                self.config.workload.seed,
            );
            tasks.push((name, tokio::spawn(worker.run())));
        }

        let probe = HealthProbe::new(
            self.handle("probe"),
            self.config.probe.interval(),
            self.ctx.clone(),
        );
        tasks.push(("probe".to_string(), tokio::spawn(probe.run())));

        debug!(tasks = tasks.len(), "Tasks started");
        tasks
    }

    /// Wait for every task up to one shared deadline, aborting stragglers.
    async fn join_tasks(&self, tasks: Vec<(String, JoinHandle<()>)>) {
        let deadline = Instant::now().checked_add(self.config.shutdown.join_timeout());
        for (name, mut task) in tasks {
            let joined = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, &mut task).await,
                None => Ok((&mut task).await),
            };
            match joined {
                Ok(Ok(())) => debug!(task = %name, "Task joined"),
                Ok(Err(e)) => warn!(task = %name, error = %e, "Task ended abnormally"),
                Err(_) => {
                    warn!(task = %name, "Task did not stop before join timeout, aborting");
                    task.abort();
                }
            }
        }
    }

    /// Drop the test table and close the bootstrap session. Never fails.
    async fn teardown(&self, bootstrap: &ReconnectingHandle, sql: &TableSql) {
        if bootstrap.connects() == 0 {
            debug!("No bootstrap session was established, skipping table drop");
            return;
        }

        let timeout = self.config.shutdown.join_timeout();
        match tokio::time::timeout(timeout, self.drop_table(bootstrap, sql)).await {
            Ok(Ok(())) => info!(table = sql.table(), "Test table dropped"),
            Ok(Err(e)) => warn!(table = sql.table(), error = %e, "Failed to drop test table"),
            Err(_) => warn!(table = sql.table(), "Timed out dropping test table"),
        }
        bootstrap.close().await;
    }

    async fn drop_table(
        &self,
        bootstrap: &ReconnectingHandle,
        sql: &TableSql,
    ) -> std::result::Result<(), DbError> {
        if let Some(session) = bootstrap.current().await {
            match schema::drop_table(session.as_ref(), sql).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_connectivity() => {
                    debug!(error = %e, "Bootstrap session lost, reconnecting for cleanup");
                }
                Err(e) => return Err(e),
            }
        }

        let session = self.connector.connect().await?;
        let result = schema::drop_table(session.as_ref(), sql).await;
        session.close().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testkit::{config, DownWindow, FakeBackend};

    #[tokio::test(start_paused = true)]
    async fn healthy_run_creates_and_drops_table() {
        let backend = FakeBackend::healthy();
        let orchestrator = Orchestrator::new(config::run(2, 2, 0.5), backend.connector());

        let summary = orchestrator.run().await.unwrap();

        assert!(summary.inserts_ok + summary.selects_ok > 0);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.outages, 0);
        assert_eq!(summary.stop_reason, Some(StopReason::DurationElapsed));
        assert_eq!(summary.elapsed_secs, 2.0);
        assert!(!backend.table_exists());
        let statements = backend.statements();
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS \"failover_test\""));
        assert_eq!(
            statements.last().map(String::as_str),
            Some("DROP TABLE IF EXISTS \"failover_test\"")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn external_stop_ends_run_early() {
        let backend = FakeBackend::healthy();
        let orchestrator = Orchestrator::new(config::run(1, 60, 0.5), backend.connector());
        let stop = orchestrator.stop_signal();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            stop.trigger(StopReason::Interrupted);
        });

        let summary = orchestrator.run().await.unwrap();

        assert_eq!(summary.stop_reason, Some(StopReason::Interrupted));
        assert_eq!(summary.elapsed_secs, 1.0);
        assert!(!backend.table_exists());
    }

    #[tokio::test(start_paused = true)]
    async fn setup_retries_through_connectivity_loss() {
        let backend = FakeBackend::healthy();
        backend.fail_next(DbError::connectivity("server closed the connection unexpectedly"));
        let orchestrator = Orchestrator::new(config::run(1, 2, 1.0), backend.connector());

        let summary = orchestrator.run().await.unwrap();

        assert!(summary.inserts_ok > 0);
        // Bootstrap reconnected once; that is not a worker reconnect.
        assert_eq!(summary.reconnects, 0);
        assert_eq!(summary.outages, 1);
        assert!(!summary.outage_open_at_end);
    }

    #[tokio::test(start_paused = true)]
    async fn application_error_during_setup_aborts() {
        let backend = FakeBackend::healthy();
        backend.fail_next(DbError::application("permission denied for schema public").with_code("42501"));
        let orchestrator = Orchestrator::new(config::run(2, 30, 0.5), backend.connector());

        let result = orchestrator.run().await;

        assert!(matches!(result, Err(Error::Schema(_))));
        assert_eq!(orchestrator.stop_signal().reason(), Some(StopReason::SetupFailed));
        assert_eq!(orchestrator.context().stats.snapshot(), Default::default());
        // Still attempts the drop.
        assert!(backend
            .statements()
            .iter()
            .any(|sql| sql.starts_with("DROP TABLE")));
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_backend_skips_workers_and_drop() {
        let backend = FakeBackend::unreachable();
        let orchestrator = Orchestrator::new(config::run(2, 3, 0.5), backend.connector());

        let summary = orchestrator.run().await.unwrap();

        assert_eq!(summary.outages, 1);
        assert!(summary.outage_open_at_end);
        assert!((summary.total_outage_secs - 3.0).abs() < 1e-6);
        assert!(backend.statements().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_join_timeout_still_cleans_up() {
        let backend = FakeBackend::healthy();
        let mut config = config::run(2, 2, 0.5);
        config.shutdown.join_timeout_secs = u64::MAX;
        let orchestrator = Orchestrator::new(config, backend.connector());

        let summary = orchestrator.run().await.unwrap();

        assert_eq!(summary.stop_reason, Some(StopReason::DurationElapsed));
        assert!(!backend.table_exists());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_reconnects_when_bootstrap_session_died() {
        let backend = FakeBackend::with_outages(vec![DownWindow::between(
            Duration::from_secs(1),
            Duration::from_secs(2),
        )]);
        let orchestrator = Orchestrator::new(config::run(1, 4, 0.5), backend.connector());

        orchestrator.run().await.unwrap();

        assert!(!backend.table_exists());
    }
}
