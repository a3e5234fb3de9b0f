//! Cooperative, set-once stop signal.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Notify;

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    DurationElapsed,
    Interrupted,
    SetupFailed,
}

impl StopReason {
    const fn as_u8(self) -> u8 {
        match self {
            Self::DurationElapsed => 1,
            Self::Interrupted => 2,
            Self::SetupFailed => 3,
        }
    }

    const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::DurationElapsed),
            2 => Some(Self::Interrupted),
            3 => Some(Self::SetupFailed),
            _ => None,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DurationElapsed => write!(f, "duration elapsed"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::SetupFailed => write!(f, "setup failed"),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    stopped: AtomicBool,
    reason: AtomicU8,
    notify: Notify,
}

/// Shared flag observed by every worker, the probe and reconnect loops.
///
/// Cloning is cheap; all clones observe the same flag. Once triggered the
/// signal is never reset.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signal. Only the first call has any effect.
    ///
    /// Returns true if this call set the signal.
    pub fn trigger(&self, reason: StopReason) -> bool {
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.inner.reason.store(reason.as_u8(), Ordering::SeqCst);
        self.inner.notify.notify_waiters();
        true
    }

    pub fn is_set(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Reason passed to the call that set the signal.
    pub fn reason(&self) -> Option<StopReason> {
        StopReason::from_u8(self.inner.reason.load(Ordering::SeqCst))
    }

    /// Wait until the signal is set.
    pub async fn stopped(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent trigger is not missed.
            notified.as_mut().enable();
            if self.is_set() {
                return;
            }
            notified.await;
        }
    }

    /// Sleep for `duration` unless the signal fires first.
    ///
    /// Returns true when the sleep was cut short by the stop signal.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_set() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => self.is_set(),
            _ = self.stopped() => true,
        }
    }
}
