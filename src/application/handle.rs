//! Self-healing session handle.
//!
//! Wraps a [`Connector`] and keeps at most one live [`Session`]. When the
//! session is found dead, or a caller reports it dead, the handle reconnects
//! with exponential backoff until it succeeds or the stop signal fires.
//!
//! Reconnects are serialized per handle: the slot lock is held for the whole
//! reconnect loop, so concurrent callers wait for the in-flight reconnect and
//! then observe its result. Callers never see a session mid-replacement.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{OutageTracker, StopSignal};
use crate::error::{Error, Result};
use crate::infrastructure::config::ReconnectionConfig;
use crate::port::{Connector, Session};

/// One owner's connection to the backend.
pub struct ReconnectingHandle {
    name: String,
    connector: Arc<dyn Connector>,
    reconnection: ReconnectionConfig,
    stop: StopSignal,
    /// Marked on failed liveness checks and failed connect attempts.
    outage: Option<Arc<OutageTracker>>,
    slot: Mutex<Option<Arc<dyn Session>>>,
    connects: AtomicU64,
}

impl ReconnectingHandle {
    /// Create a handle with no session. The first [`acquire`](Self::acquire)
    /// connects.
    pub fn new(
        name: impl Into<String>,
        connector: Arc<dyn Connector>,
        reconnection: ReconnectionConfig,
        stop: StopSignal,
    ) -> Self {
        Self {
            name: name.into(),
            connector,
            reconnection,
            stop,
            outage: None,
            slot: Mutex::new(None),
            connects: AtomicU64::new(0),
        }
    }

    /// Report connectivity failures seen while reconnecting to `tracker`.
    #[must_use]
    pub fn with_outage_tracker(mut self, tracker: Arc<OutageTracker>) -> Self {
        self.outage = Some(tracker);
        self
    }

    /// Number of sessions this handle has established.
    pub fn connects(&self) -> u64 {
        self.connects.load(Ordering::Relaxed)
    }

    /// Return the current session if it is alive, otherwise reconnect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stopped`] if the stop signal fires before a session
    /// could be established.
    pub async fn acquire(&self) -> Result<Arc<dyn Session>> {
        let mut slot = self.slot.lock().await;
        if let Some(session) = slot.as_ref() {
            if session.is_alive().await {
                return Ok(Arc::clone(session));
            }
            debug!(handle = %self.name, "Session failed liveness check");
            self.mark_failure();
        }
        self.reconnect_locked(&mut slot).await
    }

    /// Discard the current session and block until a new one is established.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stopped`] if the stop signal fires first.
    pub async fn force_reconnect(&self) -> Result<Arc<dyn Session>> {
        let mut slot = self.slot.lock().await;
        self.reconnect_locked(&mut slot).await
    }

    /// The current session without checking liveness.
    pub async fn current(&self) -> Option<Arc<dyn Session>> {
        self.slot.lock().await.clone()
    }

    /// Close and drop the current session, if any.
    pub async fn close(&self) {
        let session = self.slot.lock().await.take();
        if let Some(session) = session {
            session.close().await;
        }
    }

    async fn reconnect_locked(
        &self,
        slot: &mut Option<Arc<dyn Session>>,
    ) -> Result<Arc<dyn Session>> {
        if let Some(old) = slot.take() {
            old.close().await;
        }

        let mut backoff = self.reconnection.backoff();
        loop {
            if self.stop.is_set() {
                return Err(Error::Stopped);
            }

            let attempt = tokio::select! {
                result = self.connector.connect() => result,
                () = self.stop.stopped() => return Err(Error::Stopped),
            };

            match attempt {
                Ok(session) => {
                    let connects = self.connects.fetch_add(1, Ordering::Relaxed) + 1;
                    if backoff.attempts() > 0 {
                        info!(
                            handle = %self.name,
                            failed_attempts = backoff.attempts(),
                            "Reconnected"
                        );
                    } else {
                        debug!(handle = %self.name, connects, "Connected");
                    }
                    *slot = Some(Arc::clone(&session));
                    return Ok(session);
                }
                Err(e) => {
                    self.mark_failure();
                    let delay = backoff.next_delay();
                    warn!(
                        handle = %self.name,
                        error = %e,
                        attempt = backoff.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "Connect failed, retrying after delay"
                    );
                    if self.stop.sleep(delay).await {
                        return Err(Error::Stopped);
                    }
                }
            }
        }
    }

    fn mark_failure(&self) {
        if let Some(tracker) = &self.outage {
            tracker.record_failure();
        }
    }
}

impl std::fmt::Debug for ReconnectingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconnectingHandle")
            .field("name", &self.name)
            .field("connects", &self.connects())
            .finish_non_exhaustive()
    }
}
