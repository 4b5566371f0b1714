//! # Countdown controller.
//!
//! - [`ControllerHandle`] the UI-facing side: `trigger`, `cancel`, snapshots, history
//! - [`TriggerOutcome`] / [`CancelOutcome`] what a call did (absorbed calls carry a [`Rejection`])
//! - [`ControlError`] the controller task is gone or a session is unknown

mod command;
mod core;
mod error;
mod slot;

pub(crate) use self::core::{Controller, ControllerParts};
pub use command::{CancelOutcome, TriggerOutcome};
pub use self::core::ControllerHandle;
pub use error::{ControlError, Rejection};
