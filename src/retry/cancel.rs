//! Retry loops for background work that runs until cancelled.

use std::fmt;
use std::future::Future;

use futures::future::Map;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::backoff::Backoff;

use super::{Notify, RetryError};

/// Run `operation` until it succeeds, gives up, or `cancel` fires.
///
/// Built for indefinitely running background loops: nothing is returned.
/// Cancellation is normal termination, and a loop that ends on an error logs
/// it instead of surfacing it.
///
/// Each iteration:
///
/// 1. Stop if `cancel` is already cancelled.
/// 2. Await `operation()`:
///    - `Ok(())` ends the loop.
///    - [`RetryError::Continue`] resets the policy and goes back to 1 with no
///      delay and no notification, so a cancellation triggered by the
///      operation itself is observed before the next run.
///    - [`RetryError::Permanent`] ends the loop.
///    - [`RetryError::Transient`] asks the policy for a wait. A stop ends the
///      loop; otherwise `notify` is consulted and may end the loop, and the
///      wait is raced against `cancel`.
///
/// # Examples
///
/// ```rust
/// use ebbtide::retry::{retry_until_cancel, notify_continue, RetryError};
/// use ebbtide::backoff::ZeroBackoff;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use tokio_util::sync::CancellationToken;
///
/// # tokio_test::block_on(async {
/// let cancel = CancellationToken::new();
/// let polls = AtomicU32::new(0);
/// let (token, counter) = (&cancel, &polls);
///
/// retry_until_cancel(
///     &cancel,
///     move || async move {
///         if counter.fetch_add(1, Ordering::SeqCst) == 2 {
///             token.cancel();
///         }
///         Err::<(), _>(RetryError::<String>::Continue)
///     },
///     ZeroBackoff,
///     notify_continue("engine-watch"),
/// )
/// .await;
///
/// assert_eq!(polls.load(Ordering::SeqCst), 3);
/// # });
/// ```
pub async fn retry_until_cancel<'a, E, F, Fut, B>(
    cancel: &CancellationToken,
    mut operation: F,
    mut backoff: B,
    notify: impl Into<Notify<'a, E>>,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), RetryError<E>>>,
    B: Backoff,
    E: fmt::Display,
{
    let mut notify = notify.into();
    backoff.reset();
    let mut attempt: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            tracing::debug!(attempt, "retry loop cancelled");
            return;
        }

        attempt += 1;
        let err = match operation().await {
            Ok(()) => return,
            Err(RetryError::Continue) => {
                tracing::trace!(attempt, "operation continued; backoff reset");
                backoff.reset();
                continue;
            }
            Err(RetryError::Permanent(err)) => {
                tracing::warn!(attempt, error = %err, "retry loop stopped by permanent error");
                return;
            }
            Err(RetryError::Transient(err)) => err,
        };

        let Some(next) = backoff.next_backoff() else {
            tracing::warn!(attempt, error = %err, "retry loop stopped, backoff exhausted");
            return;
        };

        tracing::debug!(attempt, error = %err, backoff = ?next, "operation failed, retrying");
        if let Err(err) = notify.notify(RetryError::Transient(err), next) {
            tracing::warn!(attempt, error = %err, "retry loop stopped by notification");
            return;
        }

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!(attempt, "retry loop cancelled during backoff");
                return;
            }
            _ = tokio::time::sleep(next) => {}
        }
    }
}

type ContinueOnSuccess<E> = fn(Result<(), RetryError<E>>) -> Result<(), RetryError<E>>;

/// Adapt `operation` so that success means "loop again".
///
/// `Ok(())` becomes [`RetryError::Continue`]; errors pass through. Combined
/// with [`retry_until_cancel`] the operation runs until cancelled, with
/// failures backing off as usual.
pub fn must_loop<E, F, Fut>(
    mut operation: F,
) -> impl FnMut() -> Map<Fut, ContinueOnSuccess<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), RetryError<E>>>,
{
    move || operation().map(continue_on_success::<E> as ContinueOnSuccess<E>)
}

fn continue_on_success<E>(result: Result<(), RetryError<E>>) -> Result<(), RetryError<E>> {
    match result {
        Ok(()) => Err(RetryError::Continue),
        Err(err) => Err(err),
    }
}
