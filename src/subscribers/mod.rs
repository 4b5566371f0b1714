//! # Event subscribers for the alert workflow.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations for handling workflow events.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Controller ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                               │
//!                                        ┌──────────────────────┼──────────────┐
//!                                        ▼                      ▼              ▼
//!                                    LogWriter            ToastNotifier     Custom
//! ```

mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use embedded::{Toast, ToastLevel, ToastNotifier, ToastSink};
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
