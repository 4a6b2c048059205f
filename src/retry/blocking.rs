//! Blocking retry loops for synchronous operations.

use std::fmt;
use std::time::Duration;

use crate::backoff::Backoff;

use super::{Notify, RetryError};

/// Run `operation` until it succeeds or the backoff policy stops.
///
/// The policy is reset first. On [`RetryError::Transient`] the loop asks the
/// policy for the next wait and blocks the current thread for it; when the
/// policy stops, the last error is returned unchanged.
/// [`RetryError::Permanent`] is returned without retrying, and
/// [`RetryError::Continue`] resets the policy and runs again right away.
///
/// # Examples
///
/// ```rust
/// use ebbtide::retry::{retry, RetryError};
/// use ebbtide::backoff::{WithMaxRetries, ZeroBackoff};
///
/// let mut attempts = 0;
/// let result = retry(
///     || {
///         attempts += 1;
///         if attempts < 3 {
///             Err(RetryError::transient("connection refused"))
///         } else {
///             Ok(attempts)
///         }
///     },
///     WithMaxRetries::new(ZeroBackoff, 5),
/// );
///
/// assert_eq!(result, Ok(3));
/// ```
///
/// The error type needs no trait bounds; failures are logged by attempt
/// number and wait only.
pub fn retry<T, E, F, B>(operation: F, backoff: B) -> Result<T, E>
where
    F: FnMut() -> Result<T, RetryError<E>>,
    B: Backoff,
{
    run(
        operation,
        backoff,
        |attempt, _err, next| {
            tracing::debug!(attempt, backoff = ?next, "operation failed, retrying");
            Ok(())
        },
        std::thread::sleep,
    )
}

/// Like [`retry`], but consults `notify` after each retryable failure.
///
/// `notify` sees the error and the wait the policy chose, before the loop
/// sleeps. An `Err` from it ends the loop with that error, overriding the
/// policy. When the policy itself stops, `notify` is not consulted.
pub fn retry_notify<'a, T, E, F, B>(
    operation: F,
    backoff: B,
    notify: impl Into<Notify<'a, E>>,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, RetryError<E>>,
    B: Backoff,
    E: fmt::Display,
{
    drive(operation, backoff, notify.into(), std::thread::sleep)
}

pub(crate) fn drive<T, E, F, B, S>(
    operation: F,
    backoff: B,
    mut notify: Notify<'_, E>,
    sleep: S,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, RetryError<E>>,
    B: Backoff,
    E: fmt::Display,
    S: FnMut(Duration),
{
    run(
        operation,
        backoff,
        |attempt, err, next| {
            tracing::debug!(attempt, error = %err, backoff = ?next, "operation failed, retrying");
            notify.notify(RetryError::Transient(err), next)
        },
        sleep,
    )
}

/// The loop shared by both drivers. `on_failure` sees every retryable error
/// the policy allows another attempt for; `Err` from it ends the loop.
fn run<T, E, F, B, N, S>(
    mut operation: F,
    mut backoff: B,
    mut on_failure: N,
    mut sleep: S,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, RetryError<E>>,
    B: Backoff,
    N: FnMut(u64, E, Duration) -> Result<(), E>,
    S: FnMut(Duration),
{
    backoff.reset();
    let mut attempt: u64 = 0;

    loop {
        attempt += 1;
        let err = match operation() {
            Ok(value) => return Ok(value),
            Err(RetryError::Continue) => {
                tracing::trace!(attempt, "operation continued; backoff reset");
                backoff.reset();
                continue;
            }
            Err(RetryError::Permanent(err)) => {
                tracing::debug!(attempt, "permanent error, not retrying");
                return Err(err);
            }
            Err(RetryError::Transient(err)) => err,
        };

        let Some(next) = backoff.next_backoff() else {
            tracing::debug!(attempt, "backoff exhausted");
            return Err(err);
        };

        on_failure(attempt, err, next)?;

        if !next.is_zero() {
            sleep(next);
        }
    }
}
