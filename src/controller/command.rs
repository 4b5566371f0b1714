use tokio::sync::oneshot;

use crate::session::{AlertSession, SessionId};

use super::error::Rejection;

/// Result of [`ControllerHandle::trigger`](crate::ControllerHandle::trigger).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A fresh session started counting down.
    Armed(SessionId),
    /// A session was already active; the trigger was absorbed.
    Ignored {
        /// The active session.
        session: SessionId,
        /// Why nothing happened.
        reason: Rejection,
    },
}

impl TriggerOutcome {
    /// Id of the session that is active after the call.
    pub fn session_id(&self) -> SessionId {
        match self {
            TriggerOutcome::Armed(id) | TriggerOutcome::Ignored { session: id, .. } => *id,
        }
    }

    /// True when a new session was created.
    pub fn is_armed(&self) -> bool {
        matches!(self, TriggerOutcome::Armed(_))
    }
}

/// Result of [`ControllerHandle::cancel`](crate::ControllerHandle::cancel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The session moved to `Cancelled`.
    Cancelled(SessionId),
    /// Nothing to cancel; the call was absorbed.
    Ignored(Rejection),
}

/// Inbound request to the controller task.
pub(super) enum Command {
    Trigger {
        reply: oneshot::Sender<TriggerOutcome>,
    },
    Cancel {
        /// `None` cancels whatever session is current.
        session: Option<SessionId>,
        reply: oneshot::Sender<CancelOutcome>,
    },
    History {
        reply: oneshot::Sender<Vec<AlertSession>>,
    },
    /// Looks one session up in the archive.
    Archived {
        session: SessionId,
        reply: oneshot::Sender<Option<AlertSession>>,
    },
}
