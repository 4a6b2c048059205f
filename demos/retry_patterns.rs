//! Retry Patterns Example
//!
//! Demonstrates the retry drivers on a simulated flaky engine service.
//! Shows practical patterns including:
//! - Blocking retry with exponential backoff
//! - Labelled notifications that log through `tracing`
//! - A background poller that runs until cancelled
//! - Driving your own loop with a ticker

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ebbtide::config::BackoffConfig;
use ebbtide::prelude::*;
use tokio_util::sync::CancellationToken;

// ==================== Blocking Retry ====================

/// Example 1: Basic retry with exponential backoff
fn example_basic_retry() {
    println!("\n=== Example 1: Basic Retry ===");

    let mut attempts = 0;
    let policy = ExponentialBackoff::new()
        .with_initial_interval(Duration::from_millis(50))
        .with_max_elapsed_time(Duration::from_secs(5));

    let result = retry(
        || {
            attempts += 1;
            println!("  Attempt {}", attempts);
            if attempts < 3 {
                Err(RetryError::transient("engine warming up"))
            } else {
                Ok("engine ready")
            }
        },
        policy,
    );

    println!("Result: {:?}", result);
}

/// Example 2: Labelled notification logs each failure
fn example_labelled_notify() {
    println!("\n=== Example 2: Labelled Notify ===");

    let mut attempts = 0;
    let result: Result<(), String> = retry_notify(
        || {
            attempts += 1;
            Err(RetryError::transient(format!("timeout #{}", attempts)))
        },
        WithMaxRetries::new(retry_every(Duration::from_millis(20)), 2),
        "list-engines",
    );

    println!("Gave up with: {:?}", result);
}

/// Example 3: Policies loaded from configuration
fn example_config() {
    println!("\n=== Example 3: Configured Policy ===");

    let config = BackoffConfig {
        max_retries: Some(4),
        ..BackoffConfig::default()
    };
    if let Err(reason) = config.validate() {
        println!("Invalid config: {}", reason);
        return;
    }

    let mut policy = config.build();
    while let Some(wait) = policy.next_backoff() {
        println!("  would wait {:?}", wait);
    }
}

// ==================== Background Work ====================

/// Example 4: Poll until cancelled
async fn example_background_poller() {
    println!("\n=== Example 4: Background Poller ===");

    let cancel = CancellationToken::new();
    let polls = Arc::new(AtomicU32::new(0));

    let poller = {
        let cancel = cancel.clone();
        let polls = polls.clone();
        tokio::spawn(async move {
            retry_until_cancel(
                &cancel,
                must_loop(move || {
                    let polls = polls.clone();
                    async move {
                        let n = polls.fetch_add(1, Ordering::SeqCst) + 1;
                        println!("  Poll {}", n);
                        if n % 3 == 0 {
                            Err(RetryError::transient("engine busy".to_string()))
                        } else {
                            Ok(())
                        }
                    }
                }),
                retry_every(Duration::from_millis(30)),
                notify_continue("watch-engines"),
            )
            .await;
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();
    let _ = poller.await;
    println!("Poller stopped after {} polls", polls.load(Ordering::SeqCst));
}

/// Example 5: Ticker for a hand-written loop
async fn example_ticker() {
    println!("\n=== Example 5: Ticker ===");

    let mut ticker = Ticker::new(WithMaxRetries::new(
        ExponentialBackoff::new().with_initial_interval(Duration::from_millis(10)),
        3,
    ));
    let mut n = 0;
    while let Some(at) = ticker.tick().await {
        n += 1;
        println!("  Tick {} at {:?}", n, at);
    }
    println!("Ticker closed");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("======================================");
    println!("       Retry Patterns Example         ");
    println!("======================================");

    example_basic_retry();
    example_labelled_notify();
    example_config();
    example_background_poller().await;
    example_ticker().await;

    println!("\n======================================");
    println!("           Examples Complete           ");
    println!("======================================");
}
