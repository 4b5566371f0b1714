//! # Alert dispatch.
//!
//! - [`DispatchService`] at-most-once, order-insensitive fan-out to a contact list
//! - [`AlertSender`] per-contact transport ([`SimulatedSender`], [`SenderFn`])
//! - [`AlertMessage`] the composed alert; [`DispatchResult`] the delivery summary

mod message;
mod result;
mod sender;
mod service;

pub use message::AlertMessage;
pub use result::DispatchResult;
pub use sender::{AlertSender, SenderFn, SenderRef, SimulatedSender};
pub use service::DispatchService;
