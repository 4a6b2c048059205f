//! Testing utilities for code that retries.
//!
//! This module provides a deterministic clock for elapsed-time budgets,
//! assertion macros for stepping through a policy, and property-based testing
//! support for [`BackoffConfig`](crate::config::BackoffConfig).
//!
//! # Examples
//!
//! ## StepClock
//!
//! ```rust
//! use ebbtide::backoff::{Backoff, ConstantBackoff};
//! use ebbtide::testing::StepClock;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! // Every reading of the clock moves time forward by one minute.
//! let clock = Arc::new(StepClock::new(Duration::from_secs(60)));
//! let mut policy = ConstantBackoff::new(Duration::from_secs(1))
//!     .within(Duration::from_secs(90))
//!     .with_clock(clock);
//!
//! assert!(policy.next_backoff().is_some()); // 60s elapsed
//! assert!(policy.next_backoff().is_none()); // 120s elapsed
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use ebbtide::backoff::{StopBackoff, ZeroBackoff};
//! use ebbtide::{assert_backoff, assert_stop};
//! use std::time::Duration;
//!
//! let mut zero = ZeroBackoff;
//! assert_backoff!(zero, Duration::ZERO);
//!
//! let mut stop = StopBackoff;
//! assert_stop!(stop);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use crate::backoff::Clock;

/// A clock that advances by a fixed step each time it is read.
///
/// The first reading is the moment the clock was created, the second is one
/// step later, and so on. Policies read the clock once on reset and once per
/// [`next_backoff`](crate::backoff::Backoff::next_backoff), so the elapsed
/// time they observe is a multiple of the step.
#[derive(Debug)]
pub struct StepClock {
    base: Instant,
    step: Duration,
    reads: AtomicU32,
}

impl StepClock {
    /// Create a clock that advances by `step` on every reading.
    pub fn new(step: Duration) -> Self {
        Self {
            base: Instant::now(),
            step,
            reads: AtomicU32::new(0),
        }
    }

    /// Number of times the clock has been read.
    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Clock for StepClock {
    fn now(&self) -> Instant {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        self.base + self.step.saturating_mul(n)
    }
}

/// Assert that a policy's next wait equals the expected duration.
///
/// This macro will panic if the policy stops or yields a different wait.
///
/// # Example
///
/// ```rust
/// use ebbtide::backoff::ConstantBackoff;
/// use ebbtide::assert_backoff;
/// use std::time::Duration;
///
/// let mut policy = ConstantBackoff::new(Duration::from_millis(10));
/// assert_backoff!(policy, Duration::from_millis(10));
/// ```
#[macro_export]
macro_rules! assert_backoff {
    ($policy:expr, $expected:expr) => {
        match $crate::backoff::Backoff::next_backoff(&mut $policy) {
            ::core::option::Option::Some(wait) => assert_eq!(wait, $expected),
            ::core::option::Option::None => {
                panic!("Expected backoff {:?}, got Stop", $expected);
            }
        }
    };
}

/// Assert that a policy's next wait falls inside an inclusive range.
///
/// Useful for randomized policies.
///
/// # Example
///
/// ```rust
/// use ebbtide::backoff::ExponentialBackoff;
/// use ebbtide::assert_backoff_within;
/// use std::time::Duration;
///
/// let mut policy = ExponentialBackoff::new();
/// assert_backoff_within!(policy, Duration::from_millis(250), Duration::from_millis(750));
/// ```
#[macro_export]
macro_rules! assert_backoff_within {
    ($policy:expr, $low:expr, $high:expr) => {
        match $crate::backoff::Backoff::next_backoff(&mut $policy) {
            ::core::option::Option::Some(wait) => {
                assert!(
                    $low <= wait && wait <= $high,
                    "Expected backoff within {:?}..={:?}, got {:?}",
                    $low,
                    $high,
                    wait
                );
            }
            ::core::option::Option::None => {
                panic!("Expected backoff within {:?}..={:?}, got Stop", $low, $high);
            }
        }
    };
}

/// Assert that a policy stops.
///
/// This macro will panic if the policy yields another wait.
///
/// # Example
///
/// ```rust
/// use ebbtide::backoff::{WithMaxRetries, ZeroBackoff};
/// use ebbtide::assert_stop;
///
/// let mut policy = WithMaxRetries::new(ZeroBackoff, 0);
/// assert_stop!(policy);
/// ```
#[macro_export]
macro_rules! assert_stop {
    ($policy:expr) => {
        if let ::core::option::Option::Some(wait) =
            $crate::backoff::Backoff::next_backoff(&mut $policy)
        {
            panic!("Expected Stop, got backoff {:?}", wait);
        }
    };
}

#[cfg(feature = "proptest")]
use crate::config::{BackoffConfig, Strategy as BackoffStrategy};
#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
fn millis(max: u64) -> impl proptest::strategy::Strategy<Value = Duration> {
    (1..=max).prop_map(Duration::from_millis)
}

#[cfg(feature = "proptest")]
impl Arbitrary for BackoffConfig {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    /// Generates configurations that pass
    /// [`validate`](BackoffConfig::validate).
    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        let strategy = prop_oneof![
            Just(BackoffStrategy::Zero),
            Just(BackoffStrategy::Stop),
            (millis(10_000), proptest::option::of(millis(600_000))).prop_map(
                |(interval, max_elapsed_time)| BackoffStrategy::Constant {
                    interval,
                    max_elapsed_time,
                }
            ),
            (
                millis(10_000),
                0.0..0.99f64,
                1.0..4.0f64,
                millis(600_000),
                proptest::option::of(millis(3_600_000)),
            )
                .prop_map(
                    |(
                        initial_interval,
                        randomization_factor,
                        multiplier,
                        max_interval,
                        max_elapsed_time,
                    )| BackoffStrategy::Exponential {
                        initial_interval,
                        randomization_factor,
                        multiplier,
                        max_interval,
                        max_elapsed_time,
                    }
                ),
        ];

        (strategy, proptest::option::of(0..32u64))
            .prop_map(|(strategy, max_retries)| BackoffConfig {
                strategy,
                max_retries,
            })
            .boxed()
    }
}
