//! # ebbtide
//!
//! > *"Every ebb is followed by a flood"*
//!
//! Backoff policies and retry drivers for operations that fail transiently.
//!
//! ## Overview
//!
//! A [`Backoff`] policy answers one question: how long to wait before the
//! next attempt, or whether to stop. The drivers in [`retry`] invoke an
//! operation, ask the policy after every failure, optionally notify an
//! observer, and sleep:
//!
//! - [`retry`](retry::retry) and [`retry_notify`](retry::retry_notify) block
//!   the current thread.
//! - [`retry_until_cancel`](retry::retry_until_cancel) loops until a
//!   [`CancellationToken`](tokio_util::sync::CancellationToken) fires
//!   (`async` feature).
//! - [`Ticker`](retry::Ticker) turns a policy into a stream of ticks
//!   (`async` feature).
//!
//! ## Quick Example
//!
//! ```rust
//! use ebbtide::prelude::*;
//! use std::time::Duration;
//!
//! let mut attempts = 0;
//! let result = retry(
//!     || {
//!         attempts += 1;
//!         if attempts < 3 {
//!             Err(RetryError::transient("not yet"))
//!         } else {
//!             Ok(attempts)
//!         }
//!     },
//!     retry_every(Duration::from_millis(1)),
//! );
//!
//! assert_eq!(result, Ok(3));
//! ```
//!
//! Policies can also be described as data, see [`config::BackoffConfig`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod backoff;
pub mod config;
pub mod retry;
pub mod testing;

// Re-exports
pub use backoff::{
    Backoff, Clock, ConstantBackoff, ExponentialBackoff, StopBackoff, SystemClock, WithMaxRetries,
    ZeroBackoff,
};
pub use config::BackoffConfig;
pub use retry::{notify_continue, retry, retry_notify, Notify, RetryError};

#[cfg(feature = "async")]
pub use retry::{must_loop, retry_until_cancel, Ticker};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backoff::{
        retry_every, Backoff, ConstantBackoff, ExponentialBackoff, StopBackoff, WithMaxRetries,
        ZeroBackoff,
    };
    pub use crate::config::BackoffConfig;
    pub use crate::retry::{notify_continue, retry, retry_notify, Notify, RetryError};

    #[cfg(feature = "async")]
    pub use crate::retry::{must_loop, retry_until_cancel, Ticker};
}
