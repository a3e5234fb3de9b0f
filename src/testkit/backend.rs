//! In-process fake database backend.
//!
//! [`FakeBackend`] simulates a pooler/proxy whose availability can be scripted
//! over (virtual) time. Sessions it hands out die whenever the backend goes
//! down after they were established, like server-side sessions after a
//! failover. All timing uses `tokio::time`, so tests can run under paused
//! time.
//!
//! Best for: reconnect logic, outage measurement and orchestrator lifecycle
//! tests that must not depend on a real database.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::port::{Connector, DbError, Session};

/// A scripted window during which the backend refuses connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownWindow {
    /// Offset from backend creation at which the outage starts.
    pub start: Duration,
    /// Offset at which the backend accepts connections again, `None` for never.
    pub end: Option<Duration>,
}

impl DownWindow {
    pub fn between(start: Duration, end: Duration) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn starting_at(start: Duration) -> Self {
        Self { start, end: None }
    }

    fn contains(&self, offset: Duration) -> bool {
        offset >= self.start && self.end.map_or(true, |end| offset < end)
    }
}

#[derive(Debug)]
struct BackendState {
    created_at: Instant,
    windows: Vec<DownWindow>,
    manual_down: AtomicBool,
    /// Bumped every time the backend is taken down manually.
    epoch: AtomicU64,
    hang_queries: AtomicBool,
    hang_connects: AtomicBool,
    scripted_failures: Mutex<VecDeque<DbError>>,
    connect_attempts: Mutex<Vec<Instant>>,
    connects_ok: AtomicU64,
    statements: Mutex<Vec<String>>,
    table_exists: AtomicBool,
    rows: AtomicU64,
    sessions_closed: AtomicU64,
}

impl BackendState {
    fn offset(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    fn is_up_at(&self, now: Instant) -> bool {
        if self.manual_down.load(Ordering::SeqCst) {
            return false;
        }
        let offset = self.offset(now);
        !self.windows.iter().any(|window| window.contains(offset))
    }

    /// True when a scripted outage began in `(since, now]`.
    fn went_down_between(&self, since: Instant, now: Instant) -> bool {
        let since = self.offset(since);
        let now = self.offset(now);
        self.windows
            .iter()
            .any(|window| window.start > since && window.start <= now)
    }
}

/// Fake backend with scripted availability.
#[derive(Debug, Clone)]
pub struct FakeBackend {
    state: Arc<BackendState>,
}

impl FakeBackend {
    fn with_windows(windows: Vec<DownWindow>) -> Self {
        Self {
            state: Arc::new(BackendState {
                created_at: Instant::now(),
                windows,
                manual_down: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                hang_queries: AtomicBool::new(false),
                hang_connects: AtomicBool::new(false),
                scripted_failures: Mutex::new(VecDeque::new()),
                connect_attempts: Mutex::new(Vec::new()),
                connects_ok: AtomicU64::new(0),
                statements: Mutex::new(Vec::new()),
                table_exists: AtomicBool::new(false),
                rows: AtomicU64::new(0),
                sessions_closed: AtomicU64::new(0),
            }),
        }
    }

    /// A backend that is always available.
    pub fn healthy() -> Self {
        Self::with_windows(Vec::new())
    }

    /// A backend that refuses connections during each window.
    pub fn with_outages(windows: Vec<DownWindow>) -> Self {
        Self::with_windows(windows)
    }

    /// A backend that never accepts a connection.
    pub fn unreachable() -> Self {
        Self::with_windows(vec![DownWindow::starting_at(Duration::ZERO)])
    }

    /// A connector handing out sessions on this backend.
    pub fn connector(&self) -> Arc<FakeConnector> {
        Arc::new(FakeConnector {
            backend: self.clone(),
        })
    }

    /// Take the backend down (killing every open session) or bring it back.
    pub fn set_up(&self, up: bool) {
        let was_down = self.state.manual_down.swap(!up, Ordering::SeqCst);
        if !up && !was_down {
            self.state.epoch.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Make every query block forever, like a hung server.
    pub fn hang_queries(&self, hang: bool) {
        self.state.hang_queries.store(hang, Ordering::SeqCst);
    }

    /// Make every connect attempt block forever.
    pub fn hang_connects(&self, hang: bool) {
        self.state.hang_connects.store(hang, Ordering::SeqCst);
    }

    /// Fail the next statement on any session with `error`.
    pub fn fail_next(&self, error: DbError) {
        self.state.scripted_failures.lock().push_back(error);
    }

    /// Instants of every connect attempt, successful or not.
    pub fn connect_attempts(&self) -> Vec<Instant> {
        self.state.connect_attempts.lock().clone()
    }

    pub fn successful_connects(&self) -> u64 {
        self.state.connects_ok.load(Ordering::SeqCst)
    }

    /// Every statement submitted to the backend, including failed ones.
    pub fn statements(&self) -> Vec<String> {
        self.state.statements.lock().clone()
    }

    pub fn table_exists(&self) -> bool {
        self.state.table_exists.load(Ordering::SeqCst)
    }

    pub fn inserted_rows(&self) -> u64 {
        self.state.rows.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> u64 {
        self.state.sessions_closed.load(Ordering::SeqCst)
    }
}

/// Connector bound to a [`FakeBackend`].
#[derive(Debug)]
pub struct FakeConnector {
    backend: FakeBackend,
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self) -> Result<Arc<dyn Session>, DbError> {
        let state = &self.backend.state;
        let now = Instant::now();
        state.connect_attempts.lock().push(now);

        if state.hang_connects.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if !state.is_up_at(now) {
            return Err(DbError::connect("connection refused"));
        }

        state.connects_ok.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeSession {
            state: Arc::clone(state),
            established_at: now,
            epoch: state.epoch.load(Ordering::SeqCst),
            closed: AtomicBool::new(false),
        }))
    }
}

/// Session on a [`FakeBackend`].
#[derive(Debug)]
pub struct FakeSession {
    state: Arc<BackendState>,
    established_at: Instant,
    epoch: u64,
    closed: AtomicBool,
}

impl FakeSession {
    fn check_usable(&self) -> Result<(), DbError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DbError::connectivity("connection already closed"));
        }
        let now = Instant::now();
        let state = &self.state;
        if !state.is_up_at(now)
            || state.went_down_between(self.established_at, now)
            || state.epoch.load(Ordering::SeqCst) != self.epoch
        {
            return Err(DbError::connectivity(
                "server closed the connection unexpectedly",
            ));
        }
        Ok(())
    }

    async fn run(&self, sql: &str) -> Result<u64, DbError> {
        self.state.statements.lock().push(sql.to_string());

        if self.state.hang_queries.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(error) = self.state.scripted_failures.lock().pop_front() {
            return Err(error);
        }
        self.check_usable()?;

        let statement = sql.trim_start().to_ascii_uppercase();
        if statement.contains("CREATE TABLE") {
            self.state.table_exists.store(true, Ordering::SeqCst);
            return Ok(0);
        }
        if statement.starts_with("DROP TABLE") {
            self.state.table_exists.store(false, Ordering::SeqCst);
            return Ok(0);
        }
        if statement.starts_with("INSERT") {
            self.require_table()?;
            self.state.rows.fetch_add(1, Ordering::SeqCst);
            return Ok(1);
        }
        if statement.starts_with("SELECT COUNT") {
            self.require_table()?;
            return Ok(1);
        }
        Ok(1)
    }

    fn require_table(&self) -> Result<(), DbError> {
        if self.state.table_exists.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DbError::application("relation does not exist").with_code("42P01"))
        }
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn execute(&self, sql: &str, _params: &[&str]) -> Result<u64, DbError> {
        self.run(sql).await
    }

    async fn query(&self, sql: &str, _params: &[&str]) -> Result<usize, DbError> {
        self.run(sql).await.map(|rows| rows as usize)
    }

    async fn batch_execute(&self, sql: &str) -> Result<(), DbError> {
        self.run(sql).await.map(|_| ())
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.state.sessions_closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
