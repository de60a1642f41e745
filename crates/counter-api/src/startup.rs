//! Background startup helper for the counter server.
//!
//! Provides [`spawn_api`] which launches the HTTP server on a background
//! Tokio task so the service binary can wait on signals concurrently.
//!
//! # Usage
//!
//! ```rust,ignore
//! use counter_api::{spawn_api, AppState};
//! use counter_core::{Counter, Ticker};
//! use std::sync::Arc;
//!
//! let counter = Arc::new(Counter::new());
//! let ticker = Ticker::spawn(Arc::clone(&counter), period);
//! let state = Arc::new(AppState::new(counter, ticker.shutdown_signal()));
//! let handle = spawn_api(&config.server, state, ticker.shutdown_signal())?;
//! ```

use std::sync::Arc;

use counter_core::config::ServerConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::server::{self, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the counter server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the counter HTTP server on a background Tokio task.
///
/// The address is validated before the task is spawned so obvious
/// misconfigurations fail fast. The task runs until `shutdown` fires;
/// the returned [`JoinHandle`] completes once the server has drained.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the configured address is invalid.
pub fn spawn_api(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr = server::parse_addr(config)?;
    let config = config.clone();

    let handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(&config, state, shutdown).await {
            tracing::error!(error = %e, "Counter server exited with error");
        }
    });

    tracing::info!(%addr, "Counter server spawned on background task");

    Ok(handle)
}
