//! # Built-in subscribers
//!
//! - [`LogWriter`]: forwards events to `tracing` (feature `logging`).
//! - [`ToastNotifier`]: turns outcomes into user-facing [`Toast`]s.

#[cfg(feature = "logging")]
mod log;
mod toast;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use toast::{Toast, ToastLevel, ToastNotifier, ToastSink};
