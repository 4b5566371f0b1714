//! Workflow events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the countdown controller, location
//! lookups, the dispatch service and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: controller (countdown and outcome events), `LocationLookup`
//!   (late results), `DispatchService` (per-contact outcomes), `SubscriberSet`
//!   workers (overflow/panic).
//! - **Consumers**: the workflow listener (fans out to `SubscriberSet`) and any
//!   receiver obtained from `AlertWorkflow::events()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
