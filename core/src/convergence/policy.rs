//! Poll policy and per-loop poll state.
//!
//! The interval is fixed; there is no backoff. A `PollState` carries the
//! elapsed time across consecutive polls that share one budget.

use std::time::Duration;

use crate::error::{AwsError, Result};
use crate::types::config::PollSettings;

// ---------------------------------------------------------------------------
// PollPolicy
// ---------------------------------------------------------------------------

/// How often to re-check and how long to keep trying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    max_wait: Duration,
}

impl PollPolicy {
    /// The interval must be non-zero and no longer than the maximum wait.
    pub fn new(interval: Duration, max_wait: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(AwsError::config("poll interval must be greater than zero"));
        }
        if max_wait < interval {
            return Err(AwsError::config(format!(
                "poll max wait ({}s) is shorter than the interval ({}s)",
                max_wait.as_secs(),
                interval.as_secs()
            )));
        }
        Ok(PollPolicy { interval, max_wait })
    }

    pub fn from_secs(interval_secs: u64, max_wait_secs: u64) -> Result<Self> {
        PollPolicy::new(
            Duration::from_secs(interval_secs),
            Duration::from_secs(max_wait_secs),
        )
    }

    pub fn from_settings(settings: &PollSettings) -> Result<Self> {
        PollPolicy::from_secs(settings.interval_secs, settings.max_wait_secs)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Whether a poll that has waited `elapsed` has reached the maximum
    /// wait. A pending poll keeps sleeping until this holds.
    pub fn is_exhausted(&self, elapsed: Duration) -> bool {
        elapsed >= self.max_wait
    }
}

impl Default for PollPolicy {
    /// Default: check every 5 seconds for up to 30 minutes.
    fn default() -> Self {
        PollPolicy {
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(60 * 30),
        }
    }
}

// ---------------------------------------------------------------------------
// PollState
// ---------------------------------------------------------------------------

/// Elapsed time and check count of a running poll. Only the poller mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollState {
    elapsed: Duration,
    iterations: u32,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub(crate) fn record_check(&mut self) {
        self.iterations += 1;
    }

    pub(crate) fn advance(&mut self, by: Duration) {
        self.elapsed += by;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
