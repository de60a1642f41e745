//! Counter HTTP server lifecycle management.
//!
//! Provides [`start_server`] which binds to a TCP port and runs the Axum
//! server until the shutdown signal fires. Open event streams end on the
//! same signal, so graceful shutdown does not wait on them forever.

use std::net::SocketAddr;
use std::sync::Arc;

use counter_core::config::ServerConfig;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Start the counter HTTP server.
///
/// Binds to the configured address, builds the router, and serves
/// requests until `shutdown` observes `true` (or its sender is dropped).
/// Returns `Ok(())` on clean shutdown.
///
/// # Errors
///
/// Returns an error if the address is invalid, the TCP listener cannot
/// bind, or the server encounters a fatal I/O error.
pub async fn start_server(
    config: &ServerConfig,
    state: Arc<AppState>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), ServerError> {
    let addr = parse_addr(config)?;

    let router = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "Counter server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            // An error means the sender is gone, which is shutdown too.
            let _ = shutdown.wait_for(|stopping| *stopping).await;
            info!("Counter server shutting down");
        })
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    Ok(())
}

/// Resolve the configured host and port into a socket address.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the pair does not form a valid
/// address.
pub fn parse_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
    format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))
}

/// Errors that can occur when starting or running the counter server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
