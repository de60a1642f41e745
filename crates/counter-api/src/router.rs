//! Axum router construction for the counter API.
//!
//! Assembles all routes (REST + event stream) into a single [`Router`]
//! with CORS and request tracing enabled.

use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the counter server.
///
/// The router includes:
/// - `GET /` -- minimal HTML page
/// - `GET /Counter` -- current value
/// - `PUT /Counter` -- set value
/// - `PUT /Counter/Start` -- enable automatic increment
/// - `PUT /Counter/Stop` -- disable automatic increment
/// - `GET /Counter/Stream` -- server-sent event stream
///
/// Unmatched paths get a JSON 404. CORS allows any origin so the page
/// can be served from elsewhere during development.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page
        .route("/", get(handlers::index))
        // REST API
        .route(
            "/Counter",
            get(handlers::get_counter).put(handlers::set_counter),
        )
        .route("/Counter/Start", put(handlers::start_counter))
        .route("/Counter/Stop", put(handlers::stop_counter))
        // Event stream
        .route("/Counter/Stream", get(handlers::stream_counter))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
