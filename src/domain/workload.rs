//! Randomized workload mix.
//!
//! Everything here is a pure function of a caller-supplied random source and
//! the workload configuration, so tests can drive it with a seeded RNG.

use std::fmt;
use std::time::Duration;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Kind of workload operation performed in one worker iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Select,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Select => write!(f, "select"),
        }
    }
}

/// Operation mix and pacing for workload workers.
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    insert_ratio: f64,
    sleep_min: Duration,
    sleep_max: Duration,
    payload_len: usize,
}

impl Workload {
    pub fn new(
        insert_ratio: f64,
        sleep_min: Duration,
        sleep_max: Duration,
        payload_len: usize,
    ) -> Self {
        let (sleep_min, sleep_max) = if sleep_min <= sleep_max {
            (sleep_min, sleep_max)
        } else {
            (sleep_max, sleep_min)
        };
        Self {
            insert_ratio: insert_ratio.clamp(0.0, 1.0),
            sleep_min,
            sleep_max,
            payload_len,
        }
    }

    /// Pick an insert with probability `insert_ratio`, otherwise a select.
    pub fn next_operation<R: Rng + ?Sized>(&self, rng: &mut R) -> Operation {
        if rng.gen_bool(self.insert_ratio) {
            Operation::Insert
        } else {
            Operation::Select
        }
    }

    /// Uniformly random pause in `[sleep_min, sleep_max]`.
    pub fn next_pause<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.sleep_min == self.sleep_max {
            return self.sleep_min;
        }
        let min = u64::try_from(self.sleep_min.as_micros()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.sleep_max.as_micros()).unwrap_or(u64::MAX);
        Duration::from_micros(rng.gen_range(min..=max))
    }

    /// Random alphanumeric payload for inserted rows.
    pub fn payload<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.payload_len)
            .map(|_| rng.sample(Alphanumeric) as char)
            .collect()
    }
}
