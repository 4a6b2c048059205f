//! Fixed-interval backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{elapsed_cap, system_clock, Backoff, Clock};

/// A policy that always waits the same interval.
///
/// Unlike [`ExponentialBackoff`](super::ExponentialBackoff) the delay never
/// grows. With [`within`](Self::within) it stops once more than the given
/// time has elapsed since the last reset; otherwise it never stops.
///
/// # Examples
///
/// ```rust
/// use ebbtide::backoff::{retry_every, Backoff};
/// use std::time::Duration;
///
/// let mut policy = retry_every(Duration::from_millis(250)).within(Duration::from_secs(5));
/// assert_eq!(policy.next_backoff(), Some(Duration::from_millis(250)));
/// assert_eq!(policy.max_elapsed_time(), Some(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone)]
pub struct ConstantBackoff {
    interval: Duration,
    max_elapsed_time: Option<Duration>,
    start_time: Instant,
    clock: Arc<dyn Clock>,
}

impl ConstantBackoff {
    /// Wait `interval` between attempts, with no elapsed-time bound.
    pub fn new(interval: Duration) -> Self {
        let clock = system_clock();
        Self {
            interval,
            max_elapsed_time: None,
            start_time: clock.now(),
            clock,
        }
    }

    /// Stop once more than `max_elapsed` has passed since the last reset.
    ///
    /// A zero duration removes the bound.
    pub fn within(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed_time = elapsed_cap(Some(max_elapsed));
        self
    }

    /// Read time from `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self.reset();
        self
    }

    /// The fixed wait.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The elapsed-time bound, if any.
    pub fn max_elapsed_time(&self) -> Option<Duration> {
        self.max_elapsed_time
    }

    /// Time since construction or the last reset, read from the clock.
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start_time)
    }
}

/// Alias for [`ConstantBackoff::new`] that reads well inline:
/// `retry(op, retry_every(d).within(max))`.
pub fn retry_every(interval: Duration) -> ConstantBackoff {
    ConstantBackoff::new(interval)
}

impl Backoff for ConstantBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        if let Some(max) = self.max_elapsed_time {
            if self.elapsed() > max {
                return None;
            }
        }
        Some(self.interval)
    }

    fn reset(&mut self) {
        self.start_time = self.clock.now();
    }
}
