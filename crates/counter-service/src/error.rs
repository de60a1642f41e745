//! Error types for the counter service binary.
//!
//! [`ServiceError`] is the top-level error type that wraps all possible
//! failure modes during startup and shutdown.

/// Top-level error for the counter service binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: counter_core::config::ConfigError,
    },

    /// The HTTP server could not be started.
    #[error("startup error: {source}")]
    Startup {
        /// The underlying startup error.
        #[from]
        source: counter_api::startup::StartupError,
    },

    /// Installing the shutdown signal handler failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The HTTP server task ended before shutdown was requested.
    #[error("server stopped unexpectedly: {message}")]
    ServerExited {
        /// Description of how the server task ended.
        message: String,
    },
}
