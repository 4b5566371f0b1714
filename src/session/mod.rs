//! # Alert sessions.
//!
//! - [`SessionState`] the lifecycle state machine
//! - [`AlertSession`] the per-trigger record (with [`SessionId`] and [`FailureReason`])
//! - [`SessionHistory`] bounded archive of terminal sessions

mod history;
mod record;
mod state;

pub use history::SessionHistory;
pub use record::{AlertSession, FailureReason, SessionId};
pub use state::SessionState;
