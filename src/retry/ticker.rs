//! Channel-based consumption of a backoff schedule.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::backoff::Backoff;

/// Emits a tick each time the backoff policy says to try again.
///
/// The first tick arrives immediately; each later one follows the wait the
/// policy returned. When the policy stops, the ticker closes and
/// [`tick`](Self::tick) returns `None`. At most one tick is buffered, so a
/// slow consumer delays the schedule rather than accumulating ticks.
///
/// Must be created inside a tokio runtime: the schedule runs on a spawned
/// task that lives until the policy stops, [`stop`](Self::stop) is called, or
/// the ticker is dropped.
///
/// # Examples
///
/// ```rust
/// use ebbtide::retry::Ticker;
/// use ebbtide::backoff::{WithMaxRetries, ZeroBackoff};
///
/// # tokio_test::block_on(async {
/// let mut ticker = Ticker::new(WithMaxRetries::new(ZeroBackoff, 2));
/// let mut ticks = 0;
/// while ticker.tick().await.is_some() {
///     ticks += 1;
/// }
/// assert_eq!(ticks, 3); // the first tick plus two retries
/// # });
/// ```
#[derive(Debug)]
pub struct Ticker {
    ticks: mpsc::Receiver<Instant>,
    stop: CancellationToken,
}

impl Ticker {
    /// Reset `backoff` and start ticking on its schedule.
    pub fn new<B>(mut backoff: B) -> Self
    where
        B: Backoff + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        let stop = CancellationToken::new();
        backoff.reset();
        tokio::spawn(run(backoff, tx, stop.clone()));
        Self { ticks: rx, stop }
    }

    /// Wait for the next tick. `None` once the ticker has closed.
    pub async fn tick(&mut self) -> Option<Instant> {
        self.ticks.recv().await
    }

    /// Stop the schedule. A tick already buffered may still be received.
    pub fn stop(&self) {
        self.stop.cancel();
    }
}

impl Stream for Ticker {
    type Item = Instant;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Instant>> {
        self.get_mut().ticks.poll_recv(cx)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

async fn run<B: Backoff>(mut backoff: B, tx: mpsc::Sender<Instant>, stop: CancellationToken) {
    loop {
        tokio::select! {
            biased;

            _ = stop.cancelled() => return,
            sent = tx.send(Instant::now()) => {
                if sent.is_err() {
                    return;
                }
            }
        }

        let Some(next) = backoff.next_backoff() else {
            tracing::debug!("ticker closed, backoff exhausted");
            return;
        };

        tokio::select! {
            biased;

            _ = stop.cancelled() => return,
            _ = tokio::time::sleep(next) => {}
        }
    }
}
