use thiserror::Error;

use crate::session::{SessionId, SessionState};

/// Error returned by [`ControllerHandle`](crate::ControllerHandle) calls.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// Controller channel is closed (workflow shut down).
    #[error("controller channel closed")]
    Closed,

    /// The session is neither current nor archived.
    #[error("unknown session {session}")]
    UnknownSession {
        /// The session that was asked for.
        session: SessionId,
    },
}

impl ControlError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ControlError::Closed => "control_closed",
            ControlError::UnknownSession { .. } => "control_unknown_session",
        }
    }
}

/// Guard rejection absorbed by the controller as a no-op.
///
/// Never fatal: the caller gets it back inside a
/// [`TriggerOutcome`](crate::TriggerOutcome) or [`CancelOutcome`](crate::CancelOutcome).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `trigger()` while the current session is still counting down.
    #[error("a session is already arming")]
    AlreadyArming,

    /// `trigger()` while the current session is being dispatched.
    #[error("a session is already dispatching")]
    AlreadyDispatching,

    /// `cancel()` before any session existed.
    #[error("no session to cancel")]
    NoSession,

    /// `cancel()` after the countdown reached zero or the session resolved.
    #[error("session is not arming (state: {})", .state.as_label())]
    NotArming {
        /// State of the session at the time of the call.
        state: SessionState,
    },

    /// `cancel_session(id)` for a session that was already replaced.
    #[error("session was replaced by a newer one")]
    StaleSession,
}

impl Rejection {
    /// Returns a short stable label (snake_case) for use in logs and events.
    pub fn as_label(&self) -> &'static str {
        match self {
            Rejection::AlreadyArming => "already_arming",
            Rejection::AlreadyDispatching => "already_dispatching",
            Rejection::NoSession => "no_session",
            Rejection::NotArming { .. } => "not_arming",
            Rejection::StaleSession => "stale_session",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_and_messages() {
        let r = Rejection::NotArming {
            state: SessionState::Dispatching,
        };
        assert_eq!(r.as_label(), "not_arming");
        assert_eq!(r.to_string(), "session is not arming (state: dispatching)");
        assert_eq!(ControlError::Closed.as_label(), "control_closed");
    }
}
