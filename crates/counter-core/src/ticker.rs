//! Fixed-interval timer that drives [`Counter::tick`].
//!
//! The ticker runs on its own Tokio task. Its first tick fires
//! immediately on spawn; subsequent ticks follow the configured period.
//! Missed ticks are delivered in a burst (Tokio's default), so N elapsed
//! periods always produce N ticks.
//!
//! The ticker also owns the process-wide shutdown signal. Streaming
//! sessions and the HTTP server hold receivers from
//! [`Ticker::shutdown_signal`] and wind down when the ticker stops.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, trace, warn};

use crate::counter::Counter;

/// Shortest accepted tick period. Shorter periods are clamped.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// Handle to the background tick task.
///
/// Dropping the handle signals shutdown, so the task never outlives its
/// owner.
#[derive(Debug)]
pub struct Ticker {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn the tick task on the current Tokio runtime.
    ///
    /// Must be called from within a runtime context.
    pub fn spawn(counter: Arc<Counter>, period: Duration) -> Self {
        let period = period.max(MIN_TICK_PERIOD);
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            info!(period = ?period, "Counter ticker started");

            loop {
                tokio::select! {
                    biased;
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        match counter.tick() {
                            Some(snapshot) => trace!(value = snapshot.value, "Counter ticked"),
                            None => trace!("Counter stopped, tick skipped"),
                        }
                    }
                }
            }

            info!(value = counter.value(), "Counter ticker stopped");
        });

        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Signal the tick task to stop. Safe to call any number of times.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Whether shutdown has been signalled.
    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Receiver that observes `true` once shutdown is signalled.
    ///
    /// The sender side closes when the ticker is dropped; receivers
    /// should treat a closed channel as shutdown too.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Signal shutdown and wait for the tick task to exit.
    pub async fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Counter ticker task ended abnormally");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn first_tick_fires_immediately() {
        let counter = Arc::new(Counter::new());
        let ticker = Ticker::spawn(Arc::clone(&counter), PERIOD);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(counter.value(), 1);

        ticker.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn advances_once_per_period() {
        let counter = Arc::new(Counter::new());
        let ticker = Ticker::spawn(Arc::clone(&counter), PERIOD);

        // Ticks at 0s, 1s, 2s, 3s.
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(counter.value(), 4);

        tokio::time::sleep(PERIOD).await;
        assert_eq!(counter.value(), 5);

        ticker.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_counter_holds_value() {
        let counter = Arc::new(Counter::new());
        counter.stop();
        let ticker = Ticker::spawn(Arc::clone(&counter), PERIOD);

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(counter.value(), 0);

        counter.start();
        tokio::time::sleep(PERIOD).await;
        assert_eq!(counter.value(), 1);

        ticker.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_ticking_and_is_idempotent() {
        let counter = Arc::new(Counter::new());
        let ticker = Ticker::spawn(Arc::clone(&counter), PERIOD);
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        ticker.shutdown();
        ticker.shutdown();
        assert!(ticker.is_shut_down());
        ticker.join().await;

        let frozen = counter.value();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counter.value(), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_signal_reaches_receivers() {
        let counter = Arc::new(Counter::new());
        let ticker = Ticker::spawn(counter, PERIOD);
        let mut signal = ticker.shutdown_signal();
        assert!(!*signal.borrow());

        ticker.shutdown();
        signal.changed().await.unwrap();
        assert!(*signal.borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_ticker_signals_shutdown() {
        let counter = Arc::new(Counter::new());
        let ticker = Ticker::spawn(counter, PERIOD);
        let signal = ticker.shutdown_signal();

        drop(ticker);
        assert!(*signal.borrow());
    }
}
