//! # Event bus for workflow events.
//!
//! Every state change of an alert session becomes an [`Event`] on the [`Bus`].
//! The controller publishes the countdown (`SessionArmed`, `CountdownTick`,
//! `SessionCancelled`, `DispatchStarted`). A detached location lookup can still
//! publish `LocationDiscarded` after the controller has moved on. The dispatch
//! service publishes one `ContactDelivered`/`ContactFailed` per contact.
//!
//! ```text
//!   Controller      ──┐
//!   LocationLookup  ──┼──────► Bus ───┬──► subscriber_listener ──► SubscriberSet (toasts, log)
//!   DispatchService ──┘               └──► AlertWorkflow::events() (UI, tests)
//! ```
//!
//! ## Rules
//! - Publishing never waits, so a slow toast sink cannot hold back the countdown.
//! - Receivers share one ring of `Config::bus_capacity` events. A listener that falls
//!   behind gets `Lagged(n)`; the workflow listener logs it and keeps going, so a
//!   burst of per-contact events may cost a few toasts but never a dispatch.
//! - Nothing is replayed: a receiver sees only events published after it subscribed.

use tokio::sync::broadcast;

use super::event::Event;

/// Shared sender for workflow events; clones publish into the same ring.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus holding up to `capacity` undelivered events (min 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes `ev`; dropped when nobody listens.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// New receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
