//! # Workflow events emitted by the countdown controller and its collaborators.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Countdown events**: session armed, ticks, cancellation, ignored inputs
//! - **Location events**: resolved, failed, discarded, grace expired
//! - **Dispatch events**: dispatch started, per-contact outcomes, terminal outcome
//! - **Subscriber events**: overflow and panic of a subscriber worker
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! session id, remaining ticks, reasons, and the final delivery summary.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use alertvisor::{Event, EventKind, SessionId};
//!
//! let session = SessionId::new();
//! let ev = Event::new(EventKind::CountdownTick)
//!     .with_session(session)
//!     .with_remaining(3);
//!
//! assert_eq!(ev.kind, EventKind::CountdownTick);
//! assert_eq!(ev.session, Some(session));
//! assert_eq!(ev.remaining, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::contacts::ContactId;
use crate::dispatch::DispatchResult;
use crate::location::Location;
use crate::session::SessionId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of workflow events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and cause ("full", "closed")
    SubscriberOverflow,

    // === Countdown events ===
    /// A new session started counting down.
    ///
    /// Sets:
    /// - `session`: new session id
    /// - `remaining`: configured countdown
    SessionArmed,

    /// One countdown tick elapsed.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `remaining`: ticks left after this one
    CountdownTick,

    /// `trigger()` arrived while a session was active and was absorbed.
    ///
    /// Sets:
    /// - `session`: the active session
    /// - `reason`: rejection label (`already_arming`, `already_dispatching`)
    TriggerIgnored,

    /// `cancel()` arrived when there was nothing to cancel and was absorbed.
    ///
    /// Sets:
    /// - `session`: current session, if any
    /// - `reason`: rejection label
    CancelIgnored,

    /// Session cancelled while arming.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `remaining`: ticks left when cancelled (frozen)
    SessionCancelled,

    // === Location events ===
    /// Location attached to the session.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `location`: resolved coordinates
    LocationResolved,

    /// Location lookup failed; the session continues without it.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `reason`: [`LocationError`](crate::LocationError) label
    LocationFailed,

    /// A lookup finished after it was abandoned; its result was dropped.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `location`: the late coordinates, if the lookup succeeded
    /// - `reason`: `late_fix` or the error label
    LocationDiscarded,

    /// Grace period elapsed at dispatch time without a location.
    ///
    /// Sets:
    /// - `session`: session id
    GraceExpired,

    // === Dispatch events ===
    /// Countdown reached zero; cancel is no longer accepted.
    ///
    /// Sets:
    /// - `session`: session id
    DispatchStarted,

    /// Alert acknowledged by one contact.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `contact`: contact id
    ContactDelivered,

    /// Alert could not be delivered to one contact.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `contact`: contact id
    /// - `reason`: failure message
    ContactFailed,

    /// Session finished with at least one delivery.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `result`: delivery summary
    SessionDispatched,

    /// Session finished without any delivery.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `reason`: [`FailureReason`](crate::FailureReason) label
    /// - `result`: delivery summary, when delivery was attempted
    SessionFailed,
}

/// Workflow event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Session the event belongs to.
    pub session: Option<SessionId>,
    /// Ticks left in the countdown.
    pub remaining: Option<u32>,
    /// Coordinates involved.
    pub location: Option<Location>,
    /// Contact involved.
    pub contact: Option<ContactId>,
    /// Human-readable reason (errors, rejection labels, etc.).
    pub reason: Option<Arc<str>>,
    /// Final delivery summary.
    pub result: Option<Arc<DispatchResult>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            session: None,
            remaining: None,
            location: None,
            contact: None,
            reason: None,
            result: None,
        }
    }

    /// Attaches a session id.
    #[inline]
    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    /// Attaches the remaining tick count.
    #[inline]
    pub fn with_remaining(mut self, remaining: u32) -> Self {
        self.remaining = Some(remaining);
        self
    }

    /// Attaches coordinates.
    #[inline]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attaches a contact id.
    #[inline]
    pub fn with_contact(mut self, contact: ContactId) -> Self {
        self.contact = Some(contact);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the delivery summary.
    #[inline]
    pub fn with_result(mut self, result: DispatchResult) -> Self {
        self.result = Some(Arc::new(result));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    /// True for events emitted about subscriber health (never re-published to avoid loops).
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }

    /// True for the two terminal-outcome events of a dispatched session.
    #[inline]
    pub fn is_dispatch_outcome(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SessionDispatched | EventKind::SessionFailed
        )
    }
}
