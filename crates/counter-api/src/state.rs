//! Shared application state for the counter HTTP server.

use std::sync::Arc;

use counter_core::Counter;
use tokio::sync::watch;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// counter is the single process-wide instance; the shutdown receiver
/// comes from the [`Ticker`](counter_core::Ticker) and ends every open
/// stream when the service stops.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The process-wide counter.
    pub counter: Arc<Counter>,
    /// Observes `true` once the service begins shutting down.
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    /// Create application state around an existing counter.
    pub const fn new(counter: Arc<Counter>, shutdown: watch::Receiver<bool>) -> Self {
        Self { counter, shutdown }
    }

    /// Whether shutdown has been signalled or its sender is gone.
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow() || self.shutdown.has_changed().is_err()
    }
}
