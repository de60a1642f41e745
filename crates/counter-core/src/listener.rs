//! Change-notification types shared by the counter and its subscribers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Point-in-time view of the counter published with every notification.
///
/// Serialized with camelCase field names; this is the JSON payload of
/// every stream frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSnapshot {
    /// The counter value after the tick that produced this snapshot.
    pub value: i64,
    /// Whether automatic increment was enabled at the time of the tick.
    pub running: bool,
}

impl CounterSnapshot {
    /// Create a snapshot from its parts.
    pub const fn new(value: i64, running: bool) -> Self {
        Self { value, running }
    }
}

/// Opaque token identifying one listener registration.
///
/// Handles are allocated from a monotonically increasing sequence, so
/// ordering by handle is ordering by registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw sequence number behind this handle.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Callback invoked each time the ticker increments the counter.
///
/// Listeners run synchronously inside the counter's critical section, so
/// they must return quickly and must not call back into the
/// [`Counter`](crate::Counter). A panicking listener is isolated: the
/// panic is logged and the remaining listeners are still notified.
pub trait CounterListener: Send + Sync {
    /// Called with the post-increment snapshot.
    fn on_tick(&self, snapshot: CounterSnapshot);
}

impl<F> CounterListener for F
where
    F: Fn(CounterSnapshot) + Send + Sync,
{
    fn on_tick(&self, snapshot: CounterSnapshot) {
        self(snapshot);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_camel_case() {
        let json = serde_json::to_string(&CounterSnapshot::new(43, true)).unwrap();
        assert_eq!(json, r#"{"value":43,"running":true}"#);
    }

    #[test]
    fn subscription_ids_order_by_sequence() {
        let first = SubscriptionId::new(1);
        let second = SubscriptionId::new(2);
        assert!(first < second);
        assert_eq!(second.get(), 2);
        assert_eq!(first.to_string(), "sub-1");
    }
}
