//! Injectable time source for elapsed-time policies.

use std::fmt;
use std::time::Instant;

/// A source of "now" for time-bounded backoff policies.
///
/// Policies read time exclusively through this trait, so tests can swap in a
/// deterministic clock such as [`StepClock`](crate::testing::StepClock).
pub trait Clock: fmt::Debug + Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The wall clock. Default for every policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
