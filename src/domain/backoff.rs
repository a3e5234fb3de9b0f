//! Bounded exponential backoff between reconnect attempts.

use std::time::Duration;

/// Delay state for one reconnect sequence.
///
/// The k-th call to [`next_delay`](Self::next_delay) (k starting at 0) returns
/// `min(initial * multiplier^k, max)`. Delays never decrease until
/// [`reset`](Self::reset) is called.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial_delay_ms: u64,
    max_delay_ms: u64,
    multiplier: f64,
    current_delay_ms: u64,
    attempts: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, multiplier: f64) -> Self {
        let initial_delay_ms = initial.as_millis() as u64;
        let max_delay_ms = max.as_millis() as u64;
        Self {
            initial_delay_ms,
            max_delay_ms,
            multiplier,
            current_delay_ms: initial_delay_ms.min(max_delay_ms),
            attempts: 0,
        }
    }

    /// Return the current delay and advance the state for the next call.
    pub fn next_delay(&mut self) -> Duration {
        let delay = Duration::from_millis(self.current_delay_ms);

        let next_delay = (self.current_delay_ms as f64 * self.multiplier) as u64;
        self.current_delay_ms = next_delay.min(self.max_delay_ms);
        self.attempts += 1;

        delay
    }

    /// Number of delays handed out since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Return to the initial delay after a successful connection.
    pub fn reset(&mut self) {
        self.current_delay_ms = self.initial_delay_ms.min(self.max_delay_ms);
        self.attempts = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(5), 2.0)
    }
}
