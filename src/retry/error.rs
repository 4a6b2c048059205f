//! The outcome type operations return to a retry driver.

/// Why an attempt did not succeed.
///
/// Operations retried by a driver return `Result<T, RetryError<E>>`. The
/// variant tells the driver what to do next:
///
/// - [`Continue`](Self::Continue): not done and not failed. Run again right
///   away, reset the backoff, skip the notification hook.
/// - [`Transient`](Self::Transient): a retryable failure. The backoff policy
///   decides whether and when to try again.
/// - [`Permanent`](Self::Permanent): retrying is pointless. The driver
///   returns the error immediately.
///
/// `From<E>` produces `Transient`, so `?` inside an operation marks ordinary
/// errors as retryable. Permanent errors are built explicitly.
///
/// # Examples
///
/// ```rust
/// use ebbtide::retry::{retry, RetryError};
/// use ebbtide::backoff::ZeroBackoff;
///
/// fn parse(input: &str) -> Result<u32, RetryError<String>> {
///     input
///         .parse()
///         .map_err(|e: std::num::ParseIntError| RetryError::permanent(e.to_string()))
/// }
///
/// let result = retry(|| parse("not a number"), ZeroBackoff);
/// assert_eq!(result, Err("invalid digit found in string".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Loop again immediately, as if the backoff policy had just been reset.
    Continue,
    /// A failure worth retrying.
    Transient(E),
    /// A failure that must not be retried.
    Permanent(E),
}

impl<E> RetryError<E> {
    /// Wrap a retryable error.
    pub fn transient(error: E) -> Self {
        Self::Transient(error)
    }

    /// Wrap an error that ends the retry loop.
    pub fn permanent(error: E) -> Self {
        Self::Permanent(error)
    }

    /// Returns true for [`RetryError::Continue`].
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Returns true for [`RetryError::Transient`].
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Returns true for [`RetryError::Permanent`].
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    /// The wrapped error, if any.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Continue => None,
            Self::Transient(e) | Self::Permanent(e) => Some(e),
        }
    }
}

impl<E> From<E> for RetryError<E> {
    fn from(error: E) -> Self {
        Self::Transient(error)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::Transient(e) => write!(f, "{}", e),
            Self::Permanent(e) => write!(f, "permanent: {}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Continue => None,
            Self::Transient(e) | Self::Permanent(e) => Some(e),
        }
    }
}
