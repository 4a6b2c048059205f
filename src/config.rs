//! Declarative backoff configuration.
//!
//! [`BackoffConfig`] describes a policy as plain data, so it can live in a
//! service's configuration file. With the `serde` feature it (de)serializes
//! with an internally tagged `kind` field:
//!
//! ```json
//! {
//!   "strategy": {
//!     "kind": "exponential",
//!     "initial_interval": { "secs": 0, "nanos": 100000000 },
//!     "randomization_factor": 0.5,
//!     "multiplier": 2.0,
//!     "max_interval": { "secs": 10, "nanos": 0 },
//!     "max_elapsed_time": null
//!   },
//!   "max_retries": 8
//! }
//! ```
//!
//! ```rust
//! use ebbtide::config::{BackoffConfig, Strategy};
//! use std::time::Duration;
//!
//! let config = BackoffConfig {
//!     strategy: Strategy::Constant {
//!         interval: Duration::from_secs(1),
//!         max_elapsed_time: None,
//!     },
//!     max_retries: Some(3),
//! };
//! assert!(config.validate().is_ok());
//! let mut policy = config.build();
//! assert_eq!(policy.next_backoff(), Some(Duration::from_secs(1)));
//! ```

use std::time::Duration;

use crate::backoff::{
    Backoff, ConstantBackoff, ExponentialBackoff, StopBackoff, WithMaxRetries, ZeroBackoff,
};

/// A backoff policy described as data.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackoffConfig {
    /// How waits are computed.
    pub strategy: Strategy,
    /// Optional cap on the number of retries.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_retries: Option<u64>,
}

/// The shape of the wait schedule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum Strategy {
    /// Retry immediately.
    Zero,
    /// Never retry.
    Stop,
    /// Fixed interval, see [`ConstantBackoff`].
    Constant {
        /// Wait between attempts.
        interval: Duration,
        /// Elapsed-time budget; `None` is unbounded.
        max_elapsed_time: Option<Duration>,
    },
    /// Randomized exponential, see [`ExponentialBackoff`].
    Exponential {
        /// First interval.
        initial_interval: Duration,
        /// Jitter factor in `[0, 1)`.
        randomization_factor: f64,
        /// Growth factor, at least 1.
        multiplier: f64,
        /// Interval cap.
        max_interval: Duration,
        /// Elapsed-time budget; `None` is unbounded.
        max_elapsed_time: Option<Duration>,
    },
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Exponential {
            initial_interval: ExponentialBackoff::DEFAULT_INITIAL_INTERVAL,
            randomization_factor: ExponentialBackoff::DEFAULT_RANDOMIZATION_FACTOR,
            multiplier: ExponentialBackoff::DEFAULT_MULTIPLIER,
            max_interval: ExponentialBackoff::DEFAULT_MAX_INTERVAL,
            max_elapsed_time: Some(ExponentialBackoff::DEFAULT_MAX_ELAPSED_TIME),
        }
    }
}

impl BackoffConfig {
    /// Check the settings a policy cannot defend against at runtime.
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Strategy::Exponential {
            randomization_factor,
            multiplier,
            ..
        } = self.strategy
        {
            if !(0.0..1.0).contains(&randomization_factor) {
                return Err("randomization_factor must be in [0, 1)");
            }
            if !multiplier.is_finite() || multiplier < 1.0 {
                return Err("multiplier must be a finite value of at least 1");
            }
        }
        Ok(())
    }

    /// Build the described policy, already reset.
    pub fn build(&self) -> Box<dyn Backoff + Send> {
        let policy: Box<dyn Backoff + Send> = match self.strategy {
            Strategy::Zero => Box::new(ZeroBackoff),
            Strategy::Stop => Box::new(StopBackoff),
            Strategy::Constant {
                interval,
                max_elapsed_time,
            } => Box::new(
                ConstantBackoff::new(interval).within(max_elapsed_time.unwrap_or(Duration::ZERO)),
            ),
            Strategy::Exponential {
                initial_interval,
                randomization_factor,
                multiplier,
                max_interval,
                max_elapsed_time,
            } => Box::new(
                ExponentialBackoff::new()
                    .with_initial_interval(initial_interval)
                    .with_randomization_factor(randomization_factor)
                    .with_multiplier(multiplier)
                    .with_max_interval(max_interval)
                    .with_max_elapsed_time(max_elapsed_time),
            ),
        };

        match self.max_retries {
            Some(max) => Box::new(WithMaxRetries::new(policy, max)),
            None => policy,
        }
    }
}
