//! # alertvisor
//!
//! **Alertvisor** is the emergency alert workflow of a personal-safety app:
//! a user-triggered countdown that, unless cancelled, acquires the user's
//! location and dispatches **one** alert to a registered contact list.
//!
//! The crate owns the hard parts (countdown and cancel racing, a location
//! lookup that may never return, at-most-once delivery) and leaves pages,
//! forms and rendering to the host application.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        trigger() / cancel()                       ContactRegistry
//!               │                                 (profile collaborator edits)
//!               ▼                                          │ snapshot at dispatch
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  AlertWorkflow (wiring root)                                      │
//! │  - Controller task (single select! loop, owns the session slot)   │
//! │  - LocationLookup (one spawned attempt per session, abandonable)  │
//! │  - DispatchService (at-most-once ledger, per-contact fan-out)     │
//! │  - SessionHistory (bounded archive of terminal sessions)          │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        │ SessionArmed     │ LocationResolved │ ContactDeliv. │ watch::Receiver
//!        │ CountdownTick    │ LocationFailed   │ ContactFailed │ (session snapshots)
//!        │ SessionCancelled │ LocationDiscard. │ SessionDisp.  │
//!        ▼                  ▼                  ▼               ▼
//! ┌───────────────────────────────────────────────────┐      UI reads
//! │              Bus (broadcast channel)              │
//! │             (capacity: Config::bus_capacity)      │
//! └─────────────────────────┬─────────────────────────┘
//!                           ▼
//!                ┌────────────────────────┐
//!                │  subscriber_listener   │
//!                └───────────┬────────────┘
//!                            ▼
//!                      SubscriberSet
//!                     (per-sub queues)
//!                  ┌─────────┼─────────┐
//!                  ▼         ▼         ▼
//!            ToastNotifier LogWriter  custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! trigger()
//!   ├─► active session?  ─► Ignored(AlreadyArming | AlreadyDispatching)
//!   └─► AlertSession::arm(countdown), start ticker, spawn LocationLookup
//!
//! loop (one tick per Config::tick) {
//!   ├─► cancel() while Arming ─► Cancelled (remaining frozen), lookup abandoned
//!   ├─► fix arrives           ─► location attached
//!   └─► remaining == 0        ─► Dispatching (cancel() refused from here on)
//! }
//!
//! Dispatching
//!   ├─► location known or lookup finished ─► dispatch now
//!   └─► lookup pending ─► wait Config::grace ─► fix ─► dispatch with location
//!                                            └─► expired ─► dispatch without (late fix discarded)
//!
//! DispatchService::dispatch (at most once per session id)
//!   ├─► no contacts            ─► Failed(NoContacts)
//!   ├─► ≥1 contact delivered   ─► Dispatched
//!   └─► every contact failed   ─► Failed(AllDeliveriesFailed)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Workflow**      | Trigger, cancel, await the outcome, read history.            | [`AlertWorkflow`], [`ControllerHandle`]     |
//! | **Sessions**      | Tagged-state session record and its state machine.          | [`AlertSession`], [`SessionState`]          |
//! | **Location**      | Single-shot async lookup, abandonable.                       | [`LocationProvider`], [`LocationFn`]        |
//! | **Dispatch**      | At-most-once fan-out through a pluggable transport.          | [`DispatchService`], [`AlertSender`]        |
//! | **Contacts**      | Ordered copy-on-write contact list.                          | [`ContactRegistry`], [`EmergencyContact`]   |
//! | **Subscriber API**| Hook into workflow events (toasts, logging, custom).         | [`Subscribe`], [`ToastNotifier`]            |
//! | **Errors**        | Typed errors with stable labels.                             | [`LocationError`], [`DispatchError`]        |
//! | **Configuration** | Centralized timing and capacity settings.                    | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] that forwards events to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use alertvisor::{AlertWorkflow, Config, EmergencyContact, FixedLocation, Location, SessionState};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         tick: Duration::from_millis(20),
//!         ..Config::default()
//!     };
//!
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn alertvisor::Subscribe>> = vec![Arc::new(alertvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn alertvisor::Subscribe>> = Vec::new();
//!
//!     let workflow = AlertWorkflow::builder(cfg)
//!         .with_subscribers(subs)
//!         .with_contacts(vec![
//!             EmergencyContact::new("1", "Mom", "+1 (555) 123-4567", "Family"),
//!             EmergencyContact::new("2", "Dad", "+1 (555) 234-5678", "Family"),
//!         ])
//!         .with_location(Arc::new(FixedLocation(Location::new(40.0, -73.0))))
//!         .build();
//!
//!     let id = workflow.trigger().await?.session_id();
//!     let session = workflow.resolved(id).await?;
//!     assert_eq!(session.state, SessionState::Dispatched);
//!     assert!(session.result.is_some_and(|r| r.location_included));
//!
//!     workflow.shutdown().await;
//!     Ok(())
//! }
//! ```
mod contacts;
mod controller;
mod core;
mod dispatch;
mod error;
mod events;
mod location;
mod session;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{AlertWorkflow, Config, WorkflowBuilder};
pub use contacts::{ContactId, ContactRegistry, ContactUpdate, EmergencyContact};
pub use controller::{CancelOutcome, ControlError, ControllerHandle, Rejection, TriggerOutcome};
pub use dispatch::{
    AlertMessage, AlertSender, DispatchResult, DispatchService, SenderFn, SenderRef,
    SimulatedSender,
};
pub use error::{ContactError, DeliveryError, DispatchError, LocationError};
pub use events::{Bus, Event, EventKind};
pub use location::{FixedLocation, Location, LocationFn, LocationProvider, LocationRef, NoLocation};
pub use session::{AlertSession, FailureReason, SessionHistory, SessionId, SessionState};
pub use subscribers::{Subscribe, SubscriberSet, Toast, ToastLevel, ToastNotifier, ToastSink};

// Optional: expose the built-in tracing subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
