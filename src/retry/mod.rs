//! Retry drivers: run a fallible operation under a backoff policy.
//!
//! The operation decides *what* is retryable by the error it returns; the
//! [`Backoff`](crate::backoff::Backoff) policy decides *when*; the driver owns
//! the loop.
//!
//! # Quick Start
//!
//! ```rust
//! use ebbtide::retry::{retry, RetryError};
//! use ebbtide::backoff::ExponentialBackoff;
//! use std::time::Duration;
//!
//! let mut calls = 0;
//! let policy = ExponentialBackoff::new().with_initial_interval(Duration::from_millis(1));
//!
//! let result: Result<&str, String> = retry(
//!     || {
//!         calls += 1;
//!         match calls {
//!             1 => Err(RetryError::transient("connection reset".to_string())),
//!             _ => Ok("engine started"),
//!         }
//!     },
//!     policy,
//! );
//!
//! assert_eq!(result, Ok("engine started"));
//! assert_eq!(calls, 2);
//! ```
//!
//! # Drivers
//!
//! - [`retry`]: blocking loop, no hook
//! - [`retry_notify`]: blocking loop with a [`Notify`] hook that can veto
//!   further attempts
//! - [`retry_until_cancel`]: async loop for background work, bounded by a
//!   cancellation token, never returns an error (`async` feature)
//! - [`Ticker`]: a stream of ticks on the policy's schedule, for callers who
//!   drive their own loop (`async` feature)
//!
//! # Outcomes
//!
//! Operations return `Result<T, RetryError<E>>`. [`RetryError::Continue`]
//! means "not done, not failed": the driver resets the policy and runs the
//! operation again at once. Ordinary errors converted with `?` are
//! [`RetryError::Transient`]; [`RetryError::Permanent`] ends the loop.
//!
//! When the policy stops, drivers return the last operation error, never a
//! synthetic one.

mod blocking;
#[cfg(feature = "async")]
mod cancel;
mod error;
mod notify;
#[cfg(feature = "async")]
mod ticker;

pub use blocking::{retry, retry_notify};
#[cfg(feature = "async")]
pub use cancel::{must_loop, retry_until_cancel};
pub use error::RetryError;
pub use notify::{notify_continue, Notify};
#[cfg(feature = "async")]
pub use ticker::Ticker;
