//! End-to-end tests for the retry drivers under real time.
//!
//! Waits are kept in the low milliseconds; assertions only rely on sleeps
//! lasting at least as long as requested.

use std::time::{Duration, Instant};

use ebbtide::config::{BackoffConfig, Strategy};
use ebbtide::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
enum EngineError {
    Refused(u32),
    Misconfigured,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Refused(attempt) => write!(f, "connection refused on attempt {attempt}"),
            EngineError::Misconfigured => f.write_str("engine misconfigured"),
        }
    }
}

// ============================================================================
// Blocking driver
// ============================================================================

#[test]
fn distinct_errors_then_success_waits_the_policy_schedule() {
    init_tracing();

    let policy = ExponentialBackoff::new()
        .with_initial_interval(Duration::from_millis(10))
        .with_randomization_factor(0.0)
        .with_multiplier(2.0);

    let mut attempts = Vec::new();
    let mut waits = Vec::new();
    let mut seen = Vec::new();

    let result = retry_notify(
        || {
            attempts.push(Instant::now());
            match attempts.len() {
                n @ 1..=2 => Err(RetryError::transient(EngineError::Refused(n as u32))),
                _ => Ok("running"),
            }
        },
        policy,
        Notify::callback(|err: &EngineError, next: Duration| {
            seen.push(err.clone());
            waits.push(next);
            Ok(())
        }),
    );

    assert_eq!(result, Ok("running"));
    assert_eq!(attempts.len(), 3);
    assert_eq!(
        seen,
        vec![EngineError::Refused(1), EngineError::Refused(2)]
    );
    assert_eq!(
        waits,
        vec![Duration::from_millis(10), Duration::from_millis(20)]
    );
    for (pair, wait) in attempts.windows(2).zip(&waits) {
        assert!(pair[1] - pair[0] >= *wait);
    }
}

#[test]
fn constant_policy_spaces_attempts_evenly() {
    let interval = Duration::from_millis(5);
    let mut attempts = Vec::new();

    let result: Result<(), EngineError> = retry(
        || {
            attempts.push(Instant::now());
            Err(RetryError::transient(EngineError::Refused(attempts.len() as u32)))
        },
        WithMaxRetries::new(retry_every(interval), 4),
    );

    assert_eq!(result, Err(EngineError::Refused(5)));
    assert_eq!(attempts.len(), 5);
    let total = attempts[4] - attempts[0];
    assert!(total >= interval * 4, "took {total:?}");
}

#[test]
fn permanent_error_skips_notification() {
    let mut notified = 0;
    let mut calls = 0;

    let result: Result<(), EngineError> = retry_notify(
        || {
            calls += 1;
            Err(RetryError::permanent(EngineError::Misconfigured))
        },
        ZeroBackoff,
        Notify::callback(|_: &EngineError, _| {
            notified += 1;
            Ok(())
        }),
    );

    assert_eq!(result, Err(EngineError::Misconfigured));
    assert_eq!(calls, 1);
    assert_eq!(notified, 0);
}

#[test]
fn question_mark_converts_into_transient() {
    fn connect(attempt: u32) -> Result<u32, EngineError> {
        if attempt < 2 {
            Err(EngineError::Refused(attempt))
        } else {
            Ok(attempt)
        }
    }

    let mut attempt = 0;
    let result: Result<u32, EngineError> = retry(
        || -> Result<u32, RetryError<EngineError>> {
            attempt += 1;
            let port = connect(attempt)?;
            Ok(port)
        },
        WithMaxRetries::new(ZeroBackoff, 3),
    );

    assert_eq!(result, Ok(2));
}

#[test]
fn configured_policy_drives_retry() {
    let config = BackoffConfig {
        strategy: Strategy::Constant {
            interval: Duration::from_millis(1),
            max_elapsed_time: None,
        },
        max_retries: Some(2),
    };
    assert!(config.validate().is_ok());

    let mut calls = 0;
    let result: Result<(), String> = retry(
        || {
            calls += 1;
            Err(RetryError::transient(format!("attempt {calls}")))
        },
        config.build(),
    );

    assert_eq!(result, Err("attempt 3".to_string()));
    assert_eq!(calls, 3);
}

// ============================================================================
// Cancellable driver and ticker
// ============================================================================

#[cfg(feature = "async")]
mod background {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn background_loop_stops_when_cancelled_from_another_task() {
        init_tracing();

        let cancel = CancellationToken::new();
        let polls = Arc::new(AtomicU32::new(0));

        let worker = {
            let cancel = cancel.clone();
            let polls = Arc::clone(&polls);
            tokio::spawn(async move {
                retry_until_cancel(
                    &cancel,
                    must_loop(move || {
                        let polls = Arc::clone(&polls);
                        async move {
                            polls.fetch_add(1, Ordering::SeqCst);
                            Err::<(), _>(RetryError::transient("engine busy".to_string()))
                        }
                    }),
                    retry_every(Duration::from_millis(2)),
                    notify_continue("engine-poll"),
                )
                .await;
            })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), worker)
            .await
            .expect("worker did not stop after cancel")
            .unwrap();

        assert!(polls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn ticker_stream_follows_policy() {
        let start = Instant::now();
        let ticks: Vec<Instant> =
            Ticker::new(WithMaxRetries::new(retry_every(Duration::from_millis(3)), 3))
                .collect()
                .await;

        assert_eq!(ticks.len(), 4);
        assert!(ticks[0] >= start);
        for pair in ticks.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(3));
        }
    }
}
