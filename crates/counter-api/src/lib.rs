//! HTTP surface for the counter service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** for reading and setting the counter and for
//!   starting or stopping its automatic increment
//! - **Server-sent event stream** (`/Counter/Stream`) pushing every tick
//!   to each connected client
//! - **Minimal HTML page** (`GET /`) that renders the live counter
//!
//! # Architecture
//!
//! Handlers share one [`Counter`](counter_core::Counter) through
//! [`AppState`]. Each stream request opens a [`StreamSession`] that
//! subscribes a listener on the counter and unsubscribes when the client
//! disconnects or the service shuts down.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod stream;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{start_server, ServerError};
pub use startup::spawn_api;
pub use state::AppState;
pub use stream::StreamSession;
