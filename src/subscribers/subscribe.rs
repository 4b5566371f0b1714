//! # Subscriber contract
//!
//! A [`Subscribe`] implementation reacts to workflow events: a toast banner, a
//! log sink, a push notifier. The [`SubscriberSet`](crate::SubscriberSet) gives
//! each subscriber its own bounded queue and worker task, so a subscriber that
//! renders slowly never holds up the countdown.
//!
//! ## Contract
//! - `on_event` runs on the subscriber's worker, one event at a time, in bus order.
//! - `accepts` is checked on the publishing side; rejected kinds never take queue space.
//! - When the queue is full the event is dropped for that subscriber only and a
//!   `SubscriberOverflow` event is published.
//!
//! ## Example
//! ```rust
//! use alertvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Banner;
//!
//! #[async_trait]
//! impl Subscribe for Banner {
//!     async fn on_event(&self, ev: &Event) {
//!         // re-render "Alert will be sent in {remaining} seconds"
//!         let _ = ev.remaining;
//!     }
//!     fn name(&self) -> &'static str { "banner" }
//!     fn accepts(&self, kind: EventKind) -> bool {
//!         matches!(kind, EventKind::SessionArmed | EventKind::CountdownTick)
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Event handler plugged into the workflow.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name used in logs and subscriber-health events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether events of `kind` should be queued for this subscriber at all.
    fn accepts(&self, _kind: EventKind) -> bool {
        true
    }

    /// Capacity of this subscriber's queue (min 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
