//! Randomized exponential backoff.
//!
//! Each call to [`Backoff::next_backoff`] returns the current interval
//! perturbed by `±randomization_factor`, then grows the interval by
//! `multiplier`, capped at `max_interval`:
//!
//! ```text
//! randomized = current * random_in[1 - factor, 1 + factor]
//! current    = min(current * multiplier, max_interval)
//! ```
//!
//! With the defaults (500ms, factor 0.5, multiplier 1.5, cap 60s) the first
//! waits fall in `[250ms, 750ms]`, `[375ms, 1125ms]`, `[562ms, 1687ms]`, ...
//!
//! `max_interval` caps the interval before randomization, so a returned wait
//! can exceed it by up to the randomization factor. Once more than
//! `max_elapsed_time` has passed since the last reset, the policy stops.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;

use super::{elapsed_cap, system_clock, Backoff, Clock};

/// Exponential backoff with jitter and an elapsed-time budget.
///
/// # Preconditions
///
/// `randomization_factor` must be in `[0, 1)` and `multiplier` at least `1`.
/// Other values are a programming error; [`BackoffConfig::validate`] checks
/// them for externally supplied settings.
///
/// [`BackoffConfig::validate`]: crate::config::BackoffConfig::validate
///
/// # Examples
///
/// ```rust
/// use ebbtide::backoff::{Backoff, ExponentialBackoff};
/// use std::time::Duration;
///
/// let mut policy = ExponentialBackoff::new()
///     .with_initial_interval(Duration::from_millis(100))
///     .with_randomization_factor(0.0)
///     .with_multiplier(2.0)
///     .with_max_interval(Duration::from_millis(300));
///
/// assert_eq!(policy.next_backoff(), Some(Duration::from_millis(100)));
/// assert_eq!(policy.next_backoff(), Some(Duration::from_millis(200)));
/// assert_eq!(policy.next_backoff(), Some(Duration::from_millis(300)));
/// assert_eq!(policy.next_backoff(), Some(Duration::from_millis(300)));
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    randomization_factor: f64,
    multiplier: f64,
    max_interval: Duration,
    max_elapsed_time: Option<Duration>,
    current_interval: Duration,
    start_time: Instant,
    clock: Arc<dyn Clock>,
}

impl ExponentialBackoff {
    /// Default initial interval.
    pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
    /// Default randomization factor.
    pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.5;
    /// Default multiplier.
    pub const DEFAULT_MULTIPLIER: f64 = 1.5;
    /// Default interval cap.
    pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(60);
    /// Default elapsed-time budget.
    pub const DEFAULT_MAX_ELAPSED_TIME: Duration = Duration::from_secs(15 * 60);

    /// A policy with the default settings, already reset.
    pub fn new() -> Self {
        let clock = system_clock();
        Self {
            initial_interval: Self::DEFAULT_INITIAL_INTERVAL,
            randomization_factor: Self::DEFAULT_RANDOMIZATION_FACTOR,
            multiplier: Self::DEFAULT_MULTIPLIER,
            max_interval: Self::DEFAULT_MAX_INTERVAL,
            max_elapsed_time: Some(Self::DEFAULT_MAX_ELAPSED_TIME),
            current_interval: Self::DEFAULT_INITIAL_INTERVAL,
            start_time: clock.now(),
            clock,
        }
    }

    /// Set the first interval.
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self.reset();
        self
    }

    /// Set the jitter factor, in `[0, 1)`. Zero disables jitter.
    pub fn with_randomization_factor(mut self, factor: f64) -> Self {
        self.randomization_factor = factor;
        self.reset();
        self
    }

    /// Set the growth factor applied after each wait.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self.reset();
        self
    }

    /// Cap the interval before randomization.
    pub fn with_max_interval(mut self, max: Duration) -> Self {
        self.max_interval = max;
        self.reset();
        self
    }

    /// Set the elapsed-time budget. `None` or zero never stops.
    pub fn with_max_elapsed_time(mut self, max: impl Into<Option<Duration>>) -> Self {
        self.max_elapsed_time = elapsed_cap(max.into());
        self.reset();
        self
    }

    /// Read time from `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self.reset();
        self
    }

    /// The first interval.
    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    /// The jitter factor.
    pub fn randomization_factor(&self) -> f64 {
        self.randomization_factor
    }

    /// The growth factor.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// The interval cap.
    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// The elapsed-time budget, if any.
    pub fn max_elapsed_time(&self) -> Option<Duration> {
        self.max_elapsed_time
    }

    /// The interval the next call will randomize, before jitter.
    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// Time since construction or the last reset, read from the clock.
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start_time)
    }

    fn grow(&mut self) {
        let max = self.max_interval.as_secs_f64();
        let next = self.current_interval.as_secs_f64() * self.multiplier;
        // Non-finite or out-of-range products clamp instead of wrapping.
        self.current_interval = if !next.is_finite() || next >= max {
            self.max_interval
        } else {
            Duration::try_from_secs_f64(next).unwrap_or(self.max_interval)
        };
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Backoff for ExponentialBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        if let Some(max) = self.max_elapsed_time {
            if self.elapsed() > max {
                return None;
            }
        }

        let random = rand::rng().random::<f64>();
        let wait = randomized_interval(self.randomization_factor, random, self.current_interval);
        self.grow();
        Some(wait)
    }

    fn reset(&mut self) {
        self.current_interval = self.initial_interval;
        self.start_time = self.clock.now();
    }
}

/// Pick a value from `[current - factor * current, current + factor * current]`
/// using `random` in `[0, 1)`.
///
/// Works on whole nanoseconds: every integer in the range is equally likely,
/// which is why the upper bound is widened by one before flooring.
///
/// ```rust
/// use ebbtide::backoff::randomized_interval;
/// use std::time::Duration;
///
/// let two = Duration::from_nanos(2);
/// assert_eq!(randomized_interval(0.5, 0.0, two), Duration::from_nanos(1));
/// assert_eq!(randomized_interval(0.5, 0.5, two), Duration::from_nanos(2));
/// assert_eq!(randomized_interval(0.5, 0.99, two), Duration::from_nanos(3));
/// ```
pub fn randomized_interval(randomization_factor: f64, random: f64, current: Duration) -> Duration {
    let nanos = current.as_nanos();
    let delta = randomization_factor * nanos as f64;
    // Only the offset from `current` goes through floating point, so a zero
    // factor returns `current` exactly across the whole `Duration` range.
    let offset = (random * (2.0 * delta + 1.0) - delta).floor() as i128;
    let value = (nanos as i128).saturating_add(offset).max(0) as u128;
    from_nanos_saturating(value)
}

fn from_nanos_saturating(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}
