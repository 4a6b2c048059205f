//! What a driver does with each retryable failure before backing off.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use super::RetryError;

type Callback<'a, E> = Box<dyn FnMut(&E, Duration) -> Result<(), E> + Send + 'a>;

/// Notification hook consulted on each retryable failure.
///
/// A driver calls [`Notify::notify`] with the failure and the wait the
/// backoff policy chose. `Ok(())` lets the loop sleep and retry; `Err(e)`
/// ends the loop with `e`, even when the policy would allow another attempt.
///
/// # Shapes
///
/// - [`Silent`](Self::Silent): always retry, tell nobody
/// - [`Fatal`](Self::Fatal): the first failure ends the loop
/// - [`Label`](Self::Label): log the label and the error, then retry
/// - [`Callback`](Self::Callback): ask a closure
///
/// # Examples
///
/// ```rust
/// use ebbtide::retry::{retry_notify, Notify, RetryError};
/// use ebbtide::backoff::ZeroBackoff;
///
/// let mut calls = 0;
/// let result = retry_notify(
///     || {
///         calls += 1;
///         Err::<(), _>(RetryError::transient("unavailable"))
///     },
///     ZeroBackoff,
///     Notify::callback(|_err: &&'static str, _next| Err("gave up")),
/// );
///
/// assert_eq!(result, Err("gave up"));
/// assert_eq!(calls, 1);
/// ```
pub enum Notify<'a, E> {
    /// Retry without notification.
    Silent,
    /// Stop at the first retryable failure and return it.
    Fatal,
    /// Log the label with each failure and keep retrying.
    Label(Cow<'a, str>),
    /// Let a closure decide. Its error replaces the failure.
    Callback(Callback<'a, E>),
}

impl<'a, E> Notify<'a, E> {
    /// Retry without notification.
    pub fn silent() -> Self {
        Self::Silent
    }

    /// Stop at the first retryable failure.
    pub fn fatal() -> Self {
        Self::Fatal
    }

    /// Log `label` with each failure and keep retrying.
    pub fn label(label: impl Into<Cow<'a, str>>) -> Self {
        Self::Label(label.into())
    }

    /// Ask `f` on each failure; `Err` from `f` ends the loop.
    pub fn callback<F>(f: F) -> Self
    where
        F: FnMut(&E, Duration) -> Result<(), E> + Send + 'a,
    {
        Self::Callback(Box::new(f))
    }

    /// Decide whether the loop may retry after `err`, waiting `next`.
    ///
    /// [`RetryError::Continue`] is always `Ok(())` and never reaches the
    /// inner source; [`RetryError::Permanent`] always ends the loop.
    pub fn notify(&mut self, err: RetryError<E>, next: Duration) -> Result<(), E>
    where
        E: fmt::Display,
    {
        let err = match err {
            RetryError::Continue => return Ok(()),
            RetryError::Permanent(err) => return Err(err),
            RetryError::Transient(err) => err,
        };

        match self {
            Self::Silent => Ok(()),
            Self::Fatal => Err(err),
            Self::Label(label) => {
                tracing::warn!(error = %err, backoff = ?next, "{}: retrying after error", label);
                Ok(())
            }
            Self::Callback(f) => f(&err, next),
        }
    }
}

impl<E> Default for Notify<'_, E> {
    fn default() -> Self {
        Self::Silent
    }
}

impl<'a, E> From<&'a str> for Notify<'a, E> {
    fn from(label: &'a str) -> Self {
        Self::Label(Cow::Borrowed(label))
    }
}

impl<E> From<String> for Notify<'_, E> {
    fn from(label: String) -> Self {
        Self::Label(Cow::Owned(label))
    }
}

impl<E> fmt::Debug for Notify<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => f.write_str("Silent"),
            Self::Fatal => f.write_str("Fatal"),
            Self::Label(label) => f.debug_tuple("Label").field(label).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Build the notification adapter for continue-aware loops.
///
/// The result never sees [`RetryError::Continue`]: continues bypass it. An
/// absent hook ([`Notify::Silent`], which is also [`Notify::default`])
/// becomes [`Notify::Fatal`], so the first real failure ends the loop. Pass a
/// label to log and keep going, or [`Notify::callback`] to decide.
///
/// ```rust
/// use ebbtide::retry::{notify_continue, Notify, RetryError};
/// use std::time::Duration;
///
/// let mut notify: Notify<'_, String> = notify_continue(Notify::default());
/// assert_eq!(notify.notify(RetryError::Continue, Duration::ZERO), Ok(()));
/// assert_eq!(
///     notify.notify(RetryError::transient("down".to_string()), Duration::ZERO),
///     Err("down".to_string())
/// );
/// ```
pub fn notify_continue<'a, E>(inner: impl Into<Notify<'a, E>>) -> Notify<'a, E> {
    match inner.into() {
        Notify::Silent => Notify::Fatal,
        inner => inner,
    }
}

#[cfg(test)]
mod notify_tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    const NEXT: Duration = Duration::from_millis(5);

    #[test]
    fn test_continue_skips_inner() {
        let calls = AtomicU32::new(0);
        let mut notify = notify_continue(Notify::callback(|_: &&'static str, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("stop")
        }));
        assert_eq!(notify.notify(RetryError::Continue, NEXT), Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_absent_inner_becomes_fatal() {
        let notify: Notify<'_, &str> = notify_continue(Notify::default());
        assert!(matches!(notify, Notify::Fatal));
        let labelled: Notify<'_, &str> = notify_continue("engine-watch");
        assert!(matches!(labelled, Notify::Label(_)));
    }

    #[test]
    fn test_fatal_propagates_error() {
        let mut notify: Notify<'_, &str> = Notify::fatal();
        assert_eq!(notify.notify(RetryError::transient("down"), NEXT), Err("down"));
    }

    #[test]
    fn test_silent_allows_retry() {
        let mut notify: Notify<'_, &str> = Notify::default();
        assert_eq!(notify.notify(RetryError::transient("down"), NEXT), Ok(()));
    }

    #[test]
    fn test_permanent_never_reaches_inner() {
        let mut notify: Notify<'_, &str> = Notify::callback(|_, _| Ok(()));
        assert_eq!(notify.notify(RetryError::permanent("denied"), NEXT), Err("denied"));
    }

    #[test]
    fn test_callback_result_is_verbatim() {
        let mut seen = Vec::new();
        {
            let mut notify = Notify::callback(|err: &&'static str, next| {
                seen.push((err.to_string(), next));
                if *err == "fatal" {
                    Err("replaced")
                } else {
                    Ok(())
                }
            });
            assert_eq!(notify.notify(RetryError::transient("flaky"), NEXT), Ok(()));
            assert_eq!(
                notify.notify(RetryError::transient("fatal"), NEXT),
                Err("replaced")
            );
        }
        assert_eq!(
            seen,
            vec![("flaky".to_string(), NEXT), ("fatal".to_string(), NEXT)]
        );
    }

    #[test]
    fn test_label_conversions() {
        let borrowed: Notify<'_, &str> = "engine-watch".into();
        let owned: Notify<'_, &str> = String::from("engine-watch").into();
        assert!(matches!(borrowed, Notify::Label(Cow::Borrowed("engine-watch"))));
        assert!(matches!(owned, Notify::Label(ref l) if l == "engine-watch"));
    }

    #[test]
    fn test_debug_hides_callback() {
        let notify: Notify<'_, &str> = Notify::callback(|_, _| Ok(()));
        assert_eq!(format!("{:?}", notify), "Callback(..)");
        let label: Notify<'_, &str> = Notify::label("x");
        assert_eq!(format!("{:?}", label), "Label(\"x\")");
    }
}
