//! Counter service binary.
//!
//! This is the main entry point that wires together the counter engine,
//! its ticker, and the HTTP API. It loads configuration, starts every
//! subsystem, and runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `counter-config.yaml` (or `COUNTER_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the counter from the configured initial state
//! 4. Spawn the ticker (first tick fires immediately)
//! 5. Spawn the HTTP server
//! 6. Wait for `Ctrl-C` or an unexpected server exit
//! 7. Stop the ticker, which ends every open stream, then drain the server

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use counter_api::AppState;
use counter_core::config::{LoggingConfig, ServiceConfig};
use counter_core::{Counter, Ticker};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ServiceError;

/// Config file looked up in the working directory when `COUNTER_CONFIG`
/// is unset.
const DEFAULT_CONFIG_PATH: &str = "counter-config.yaml";

/// Application entry point for the counter service.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the server cannot be
/// started, or the server stops before shutdown was requested.
#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("counter-service starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded from file"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        tick_interval_ms = config.counter.tick_interval_ms,
        initial_value = config.counter.initial_value,
        start_running = config.counter.start_running,
        host = %config.server.host,
        port = config.server.port,
        "Configuration resolved"
    );

    // 3. Create the counter.
    let counter = Arc::new(Counter::with_state(
        config.counter.initial_value,
        config.counter.start_running,
    ));

    // 4. Start ticking.
    let ticker = Ticker::spawn(Arc::clone(&counter), config.counter.tick_interval());

    // 5. Start the HTTP server.
    let state = Arc::new(AppState::new(Arc::clone(&counter), ticker.shutdown_signal()));
    let mut server = counter_api::spawn_api(&config.server, state, ticker.shutdown_signal())?;

    // 6. Run until interrupted.
    let (outcome, server_finished) = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if signal.is_ok() {
                info!("Shutdown signal received");
            }
            (signal.map_err(ServiceError::from), false)
        }
        joined = &mut server => {
            let message = match joined {
                Ok(()) => String::from("server task returned"),
                Err(e) => e.to_string(),
            };
            (Err(ServiceError::ServerExited { message }), true)
        }
    };

    // 7. Stop the ticker; open streams and the server follow the same signal.
    ticker.join().await;
    if !server_finished {
        if let Err(e) = server.await {
            warn!(error = %e, "Counter server task ended abnormally");
        }
    }

    info!(final_value = counter.value(), "counter-service shutdown complete");
    outcome
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load the service configuration.
///
/// Reads the file named by `COUNTER_CONFIG`, or `counter-config.yaml` in
/// the working directory. When no file exists, defaults are used with
/// environment overrides still applied. Returns the path that was read,
/// if any.
fn load_config() -> Result<(ServiceConfig, Option<PathBuf>), ServiceError> {
    let path = std::env::var_os("COUNTER_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = ServiceConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = ServiceConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok((config, None))
    }
}
