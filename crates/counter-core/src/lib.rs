//! Core engine for the counter service.
//!
//! This crate owns the single mutable counter and everything that drives
//! it, independent of any transport:
//!
//! - [`Counter`] holds the value, the running flag, and the listener
//!   registry behind one lock
//! - [`Ticker`] owns the periodic timer that advances the counter and
//!   doubles as the process-wide shutdown signal
//! - [`config`] loads the YAML service configuration
//!
//! # Architecture
//!
//! The counter is constructed once by the service binary, wrapped in an
//! [`Arc`](std::sync::Arc), and handed to the ticker and to every HTTP
//! handler. Only the ticker produces change notifications; direct writes
//! through [`Counter::set_value`] are silent.

pub mod config;
pub mod counter;
pub mod listener;
pub mod ticker;

pub use counter::Counter;
pub use listener::{CounterListener, CounterSnapshot, SubscriptionId};
pub use ticker::Ticker;
