//! Server-sent event streaming of counter ticks.
//!
//! Each `GET /Counter/Stream` request opens one [`StreamSession`]. The
//! session registers a listener on the [`Counter`] that forwards every
//! tick into a per-session channel, and turns each received snapshot
//! into one frame:
//!
//! ```text
//! data:{"value":43,"running":true}\n\n
//! ```
//!
//! The session wakes on exactly two conditions: a new notification or
//! service shutdown. A client disconnect drops the response body, which
//! drops the session; the listener is removed in `Drop`, so it is gone
//! before the session is discarded on every exit path.

use std::convert::Infallible;
use std::sync::Arc;

use counter_core::{Counter, CounterSnapshot, SubscriptionId};
use futures::Stream;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Lifecycle of a streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed but not yet subscribed.
    Idle,
    /// Subscribed and forwarding notifications.
    Streaming,
    /// Unsubscribed. Terminal.
    Closed,
}

/// Why a session left the `Streaming` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    Shutdown,
    Disconnected,
}

impl CloseReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Shutdown => "service shutdown",
            Self::Disconnected => "client disconnected",
        }
    }
}

/// One client's subscription to the counter's tick notifications.
#[derive(Debug)]
pub struct StreamSession {
    counter: Arc<Counter>,
    subscription: Option<SubscriptionId>,
    updates: mpsc::UnboundedReceiver<CounterSnapshot>,
    shutdown: watch::Receiver<bool>,
    state: SessionState,
}

impl StreamSession {
    /// Subscribe to `counter` and enter the `Streaming` state.
    ///
    /// Notifications emitted from this point on are queued for the
    /// session until it is polled. If `shutdown` has already fired the
    /// first poll ends the stream.
    pub fn open(counter: Arc<Counter>, shutdown: watch::Receiver<bool>) -> Self {
        let (tx, updates) = mpsc::unbounded_channel();
        let mut session = Self {
            counter,
            subscription: None,
            updates,
            shutdown,
            state: SessionState::Idle,
        };

        // A send only fails once the session dropped its receiver, and
        // by then the listener is being removed.
        let id = session.counter.subscribe(move |snapshot: CounterSnapshot| {
            let _ = tx.send(snapshot);
        });
        session.subscription = Some(id);
        session.state = SessionState::Streaming;

        info!(subscription = %id, "Start counter streaming");
        session
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Wait for the next notification.
    ///
    /// Returns `None` once the session is closed, either because the
    /// service is shutting down or because it was already closed.
    pub async fn next_snapshot(&mut self) -> Option<CounterSnapshot> {
        loop {
            if self.state != SessionState::Streaming {
                return None;
            }
            if *self.shutdown.borrow_and_update() {
                self.close(CloseReason::Shutdown);
                return None;
            }

            tokio::select! {
                biased;
                changed = self.shutdown.changed() => {
                    // A closed channel means the ticker is gone.
                    if changed.is_err() {
                        self.close(CloseReason::Shutdown);
                        return None;
                    }
                }
                update = self.updates.recv() => {
                    if let Some(snapshot) = update {
                        return Some(snapshot);
                    }
                    // Unreachable while subscribed: the listener owns a sender.
                    self.close(CloseReason::Shutdown);
                    return None;
                }
            }
        }
    }

    /// Convert the session into a stream of encoded SSE frames.
    ///
    /// The stream ends on shutdown. Dropping it closes the session.
    pub fn into_frames(self) -> impl Stream<Item = Result<String, Infallible>> + Send + 'static {
        futures::stream::unfold(self, |mut session| async move {
            loop {
                let snapshot = session.next_snapshot().await?;
                match encode_frame(&snapshot) {
                    Ok(frame) => return Some((Ok::<_, Infallible>(frame), session)),
                    Err(e) => warn!(error = %e, "Failed to serialize counter frame, skipping"),
                }
            }
        })
    }

    /// Leave the `Streaming` state, unsubscribing from the counter.
    fn close(&mut self, reason: CloseReason) {
        if let Some(id) = self.subscription.take() {
            self.counter.unsubscribe(id);
            info!(subscription = %id, reason = reason.as_str(), "Stop counter streaming");
        }
        if self.state != SessionState::Closed {
            debug!(from = ?self.state, "Stream session closed");
            self.state = SessionState::Closed;
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close(CloseReason::Disconnected);
    }
}

/// Encode one snapshot as a server-sent event frame.
///
/// The frame is `data:` immediately followed by the JSON object and a
/// blank line.
///
/// # Errors
///
/// Returns the serializer error if the snapshot cannot be encoded.
pub fn encode_frame(snapshot: &CounterSnapshot) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(snapshot)?;
    Ok(format!("data:{json}\n\n"))
}
