//! The process-wide counter and its listener registry.
//!
//! [`Counter`] keeps the value, the running flag, and the registered
//! listeners behind a single [`Mutex`]. Every mutation and every
//! notification fan-out is serialized through that lock, so a listener
//! never observes a value/running pair that did not exist, and a call to
//! [`Counter::unsubscribe`] that has returned guarantees the listener is
//! never invoked again.
//!
//! # Notification asymmetry
//!
//! Only [`Counter::tick`] notifies listeners. [`Counter::set_value`]
//! overwrites the value silently; subscribers see the new value on the
//! next tick.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error};

use crate::listener::{CounterListener, CounterSnapshot, SubscriptionId};

/// State guarded by the counter lock.
struct CounterInner {
    value: i64,
    running: bool,
    listeners: BTreeMap<SubscriptionId, Box<dyn CounterListener>>,
    next_id: u64,
}

impl CounterInner {
    const fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot::new(self.value, self.running)
    }
}

/// A single mutable integer with a pausable auto-increment and a
/// one-to-many change notification fan-out.
///
/// Shared via [`Arc`](std::sync::Arc) between the [`Ticker`](crate::Ticker)
/// and the HTTP layer. All methods take `&self`.
pub struct Counter {
    inner: Mutex<CounterInner>,
}

impl Counter {
    /// Create a counter at zero with automatic increment enabled.
    pub const fn new() -> Self {
        Self::with_state(0, true)
    }

    /// Create a counter with an explicit starting value and running flag.
    pub const fn with_state(value: i64, running: bool) -> Self {
        Self {
            inner: Mutex::new(CounterInner {
                value,
                running,
                listeners: BTreeMap::new(),
                next_id: 0,
            }),
        }
    }

    /// Acquire the state lock.
    ///
    /// Listener panics are caught before they can unwind through the
    /// guard, so poisoning only follows a bug elsewhere; the state is a
    /// plain integer and flag, so it is recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, CounterInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current counter value.
    pub fn value(&self) -> i64 {
        self.lock().value
    }

    /// Overwrite the counter value.
    ///
    /// Does not notify listeners.
    pub fn set_value(&self, value: i64) {
        self.lock().value = value;
    }

    /// Whether ticks currently advance the value.
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Enable automatic increment. Idempotent.
    pub fn start(&self) {
        self.lock().running = true;
    }

    /// Disable automatic increment. Idempotent.
    ///
    /// Ticks that fire while stopped are dropped, not deferred.
    pub fn stop(&self) {
        self.lock().running = false;
    }

    /// Consistent view of the value and running flag.
    pub fn snapshot(&self) -> CounterSnapshot {
        self.lock().snapshot()
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Register a listener for tick notifications.
    ///
    /// The listener receives every notification emitted from now until
    /// it is removed with [`unsubscribe`](Self::unsubscribe). Nothing
    /// emitted earlier is replayed.
    pub fn subscribe<L>(&self, listener: L) -> SubscriptionId
    where
        L: CounterListener + 'static,
    {
        let mut inner = self.lock();
        let id = SubscriptionId::new(inner.next_id);
        inner.next_id = inner.next_id.wrapping_add(1);
        inner.listeners.insert(id, Box::new(listener));
        debug!(subscription = %id, listeners = inner.listeners.len(), "Listener subscribed");
        id
    }

    /// Remove a listener.
    ///
    /// Returns `false` if the handle was already removed; that is not an
    /// error.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let removed = inner.listeners.remove(&id).is_some();
        if removed {
            debug!(subscription = %id, listeners = inner.listeners.len(), "Listener unsubscribed");
        }
        removed
    }

    /// Advance the counter by one timer step.
    ///
    /// When running, increments the value by exactly one and notifies
    /// every listener in registration order, returning the published
    /// snapshot. When stopped, does nothing and returns `None`.
    ///
    /// The increment wraps at `i64::MAX`.
    pub fn tick(&self) -> Option<CounterSnapshot> {
        let mut inner = self.lock();
        if !inner.running {
            return None;
        }

        inner.value = inner.value.wrapping_add(1);
        let snapshot = inner.snapshot();

        for (id, listener) in &inner.listeners {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.on_tick(snapshot)));
            if let Err(payload) = outcome {
                error!(
                    subscription = %id,
                    value = snapshot.value,
                    reason = panic_message(payload.as_ref()),
                    "Counter listener panicked, continuing notification"
                );
            }
        }

        Some(snapshot)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Counter")
            .field("value", &inner.value)
            .field("running", &inner.running)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}
