//! REST and streaming endpoint handlers for the counter server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML page rendering the live counter |
//! | `GET` | `/Counter` | Current value |
//! | `PUT` | `/Counter` | Overwrite the value |
//! | `PUT` | `/Counter/Start` | Enable automatic increment |
//! | `PUT` | `/Counter/Stop` | Disable automatic increment |
//! | `GET` | `/Counter/Stream` | Server-sent event stream of ticks |

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{Html, IntoResponse};
use axum::Json;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::stream::StreamSession;

/// Request and response body for `GET /Counter` and `PUT /Counter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterValue {
    /// The counter value.
    pub value: i64,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page that follows the stream and drives the
/// control endpoints.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let value = state.counter.value();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Counter</title>
    <style>
        body {{ font-family: sans-serif; padding: 2rem; max-width: 480px; margin: 0 auto; }}
        #counter {{ font-size: 4rem; font-weight: bold; }}
        button, input {{ font-size: 1rem; margin: 0.25rem 0.25rem 0.25rem 0; }}
    </style>
</head>
<body>
    <h1>Counter</h1>
    <div id="counter">{value}</div>
    <p>
        <button onclick="startCounter()">Start</button>
        <button onclick="stopCounter()">Stop</button>
    </p>
    <p>
        <input id="set-value" type="number" value="0">
        <button onclick="setCounter()">Set</button>
    </p>
    <script>
        const source = new EventSource('/Counter/Stream');
        source.onmessage = (event) => {{
            document.getElementById('counter').textContent = JSON.parse(event.data).value;
        }};
        function startCounter() {{ fetch('/Counter/Start', {{ method: 'PUT' }}); }}
        function stopCounter() {{ fetch('/Counter/Stop', {{ method: 'PUT' }}); }}
        function setCounter() {{
            const value = Number(document.getElementById('set-value').value);
            fetch('/Counter', {{
                method: 'PUT',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify({{ value }}),
            }});
        }}
    </script>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /Counter
// ---------------------------------------------------------------------------

/// Return the current counter value.
pub async fn get_counter(State(state): State<Arc<AppState>>) -> Json<CounterValue> {
    Json(CounterValue {
        value: state.counter.value(),
    })
}

// ---------------------------------------------------------------------------
// PUT /Counter
// ---------------------------------------------------------------------------

/// Overwrite the counter value.
///
/// Listeners are not notified; open streams see the new value on the
/// next tick.
pub async fn set_counter(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CounterValue>,
) -> StatusCode {
    info!(value = body.value, "Setting counter");
    state.counter.set_value(body.value);
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// PUT /Counter/Start and PUT /Counter/Stop
// ---------------------------------------------------------------------------

/// Enable automatic increment.
pub async fn start_counter(State(state): State<Arc<AppState>>) -> StatusCode {
    info!("Start increasing counter");
    state.counter.start();
    StatusCode::OK
}

/// Disable automatic increment.
pub async fn stop_counter(State(state): State<Arc<AppState>>) -> StatusCode {
    info!("Stop increasing counter");
    state.counter.stop();
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// GET /Counter/Stream
// ---------------------------------------------------------------------------

/// Open a server-sent event stream of counter ticks.
///
/// The response body never ends on its own; it closes when the client
/// disconnects or the service shuts down. Each frame is flushed as soon
/// as it is produced.
pub async fn stream_counter(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    if state.is_shutting_down() {
        return Err(ApiError::ShuttingDown(
            "counter stream is closed for shutdown".to_owned(),
        ));
    }

    let session = StreamSession::open(Arc::clone(&state.counter), state.shutdown.clone());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(session.into_frames()),
    ))
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Respond to unmatched paths with a JSON 404.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {uri}"))
}
