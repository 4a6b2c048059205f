//! Retry-count cap for any policy.

use std::time::Duration;

use super::Backoff;

/// Wraps a policy and stops after `max_retries` waits.
///
/// The count restarts on [`Backoff::reset`], which also resets the inner
/// policy.
///
/// ```rust
/// use ebbtide::backoff::{Backoff, WithMaxRetries, ZeroBackoff};
/// use std::time::Duration;
///
/// let mut policy = WithMaxRetries::new(ZeroBackoff, 2);
/// assert_eq!(policy.next_backoff(), Some(Duration::ZERO));
/// assert_eq!(policy.next_backoff(), Some(Duration::ZERO));
/// assert_eq!(policy.next_backoff(), None);
/// ```
#[derive(Debug, Clone)]
pub struct WithMaxRetries<B> {
    inner: B,
    max_retries: u64,
    tries: u64,
}

impl<B: Backoff> WithMaxRetries<B> {
    /// Allow at most `max_retries` retries of `inner`.
    pub fn new(inner: B, max_retries: u64) -> Self {
        Self {
            inner,
            max_retries,
            tries: 0,
        }
    }

    /// Waits handed out since the last reset.
    pub fn tries(&self) -> u64 {
        self.tries
    }

    /// The wrapped policy.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Unwrap the inner policy.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: Backoff> Backoff for WithMaxRetries<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.tries >= self.max_retries {
            return None;
        }
        self.tries += 1;
        self.inner.next_backoff()
    }

    fn reset(&mut self) {
        self.tries = 0;
        self.inner.reset();
    }
}
