//! Backoff policies: stateful strategies that compute successive waits.
//!
//! A policy answers one question per failed attempt: how long to wait before
//! trying again, or whether to stop. [`Backoff::next_backoff`] returns
//! `Some(wait)` to retry after `wait` and `None` to stop.
//!
//! # Policies
//!
//! - [`ZeroBackoff`]: retry immediately, forever
//! - [`StopBackoff`]: never retry
//! - [`ConstantBackoff`]: fixed interval, optionally bounded by elapsed time
//! - [`ExponentialBackoff`]: randomized exponential growth with a cap
//! - [`WithMaxRetries`]: caps the number of retries of any other policy
//!
//! ```rust
//! use ebbtide::backoff::{Backoff, ConstantBackoff, StopBackoff};
//! use std::time::Duration;
//!
//! let mut every_second = ConstantBackoff::new(Duration::from_secs(1));
//! assert_eq!(every_second.next_backoff(), Some(Duration::from_secs(1)));
//!
//! let mut never = StopBackoff;
//! assert_eq!(never.next_backoff(), None);
//! ```
//!
//! Policies are single-owner: a driver holds `&mut` access for the whole loop.
//! Reusing a policy across several loops is fine, because every driver calls
//! [`Backoff::reset`] before it starts.

mod clock;
mod constant;
mod exponential;
mod max_retries;

use std::sync::Arc;
use std::time::Duration;

pub use clock::{Clock, SystemClock};
pub use constant::{retry_every, ConstantBackoff};
pub use exponential::{randomized_interval, ExponentialBackoff};
pub use max_retries::WithMaxRetries;

/// A backoff policy for retrying an operation.
pub trait Backoff {
    /// The duration to wait before the next attempt, or `None` to stop.
    fn next_backoff(&mut self) -> Option<Duration>;

    /// Restore the state the policy had right after construction.
    ///
    /// An injected [`Clock`] is kept.
    fn reset(&mut self);
}

impl<B: Backoff + ?Sized> Backoff for &mut B {
    fn next_backoff(&mut self) -> Option<Duration> {
        (**self).next_backoff()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

impl<B: Backoff + ?Sized> Backoff for Box<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        (**self).next_backoff()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Always waits zero: retry immediately and indefinitely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroBackoff;

impl Backoff for ZeroBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        Some(Duration::ZERO)
    }

    fn reset(&mut self) {}
}

/// Always stops: the operation is never retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopBackoff;

impl Backoff for StopBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        None
    }

    fn reset(&mut self) {}
}

pub(crate) fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// `Some(cap)` when the cap actually bounds anything; zero means unbounded.
pub(crate) fn elapsed_cap(cap: Option<Duration>) -> Option<Duration> {
    cap.filter(|d| !d.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_repeats(policy: &mut dyn Backoff, expected: Option<Duration>) {
        for i in 0..10 {
            assert_eq!(policy.next_backoff(), expected, "call {}", i);
        }
    }

    #[test]
    fn zero_backoff_always_zero() {
        assert_repeats(&mut ZeroBackoff, Some(Duration::ZERO));
    }

    #[test]
    fn stop_backoff_always_stops() {
        assert_repeats(&mut StopBackoff, None);
    }

    #[test]
    fn boxed_policy_delegates() {
        let mut boxed: Box<dyn Backoff> = Box::new(ZeroBackoff);
        assert_eq!(boxed.next_backoff(), Some(Duration::ZERO));
        boxed.reset();
        assert_eq!(boxed.next_backoff(), Some(Duration::ZERO));
    }

    #[test]
    fn borrowed_policy_delegates() {
        fn first<B: Backoff>(mut policy: B) -> Option<Duration> {
            policy.next_backoff()
        }

        let mut policy = ZeroBackoff;
        assert_eq!(first(&mut policy), Some(Duration::ZERO));
        assert_eq!(first(&mut StopBackoff), None);
    }

    #[test]
    fn zero_cap_is_unbounded() {
        assert_eq!(elapsed_cap(Some(Duration::ZERO)), None);
        assert_eq!(elapsed_cap(None), None);
        assert_eq!(
            elapsed_cap(Some(Duration::from_secs(1))),
            Some(Duration::from_secs(1))
        );
    }
}
