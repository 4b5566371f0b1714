//! # AlertSession: the record of one trigger-to-resolution lifecycle.
//!
//! Sessions are created by the countdown controller on `trigger()` and only
//! ever mutated through the transition methods below, which refuse moves the
//! [`SessionState`] machine does not permit. Everybody else works on clones
//! (snapshots) handed out through the session slot.

use std::fmt;
use std::time::SystemTime;

use uuid::Uuid;

use crate::dispatch::DispatchResult;
use crate::location::Location;
use crate::session::SessionState;

/// Opaque identifier, unique per trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Why a session ended in [`SessionState::Failed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// The contact list was empty at dispatch time.
    NoContacts,
    /// Every contact delivery failed.
    AllDeliveriesFailed,
    /// The dispatch service refused the session (at-most-once guard).
    Rejected,
}

impl FailureReason {
    /// Short snake_case label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            FailureReason::NoContacts => "no_contacts",
            FailureReason::AllDeliveriesFailed => "all_deliveries_failed",
            FailureReason::Rejected => "rejected",
        }
    }
}

/// One alert lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertSession {
    /// Unique per trigger.
    pub id: SessionId,
    /// Current lifecycle state.
    pub state: SessionState,
    /// Ticks left before dispatch; strictly decreasing while `Arming`, frozen afterwards.
    pub seconds_remaining: u32,
    /// Location attached to the session, if one resolved in time.
    pub location: Option<Location>,
    /// When the session was triggered.
    pub started_at: SystemTime,
    /// When the session reached a terminal state.
    pub resolved_at: Option<SystemTime>,
    /// Set when the session ends in `Failed`.
    pub failure: Option<FailureReason>,
    /// Delivery summary, once a dispatch has completed.
    pub result: Option<DispatchResult>,
}

impl AlertSession {
    /// Creates a new `Arming` session with `countdown` ticks to go.
    pub(crate) fn arm(countdown: u32) -> Self {
        Self {
            id: SessionId::new(),
            state: SessionState::Arming,
            seconds_remaining: countdown,
            location: None,
            started_at: SystemTime::now(),
            resolved_at: None,
            failure: None,
            result: None,
        }
    }

    /// Applies one tick. Returns the new remaining count, or `None` when the
    /// session is not counting down.
    pub(crate) fn tick(&mut self) -> Option<u32> {
        if self.state != SessionState::Arming || self.seconds_remaining == 0 {
            return None;
        }
        self.seconds_remaining -= 1;
        Some(self.seconds_remaining)
    }

    /// `Arming → Cancelled`.
    pub(crate) fn cancel(&mut self) -> bool {
        self.transition(SessionState::Cancelled)
    }

    /// `Arming → Dispatching`.
    pub(crate) fn begin_dispatch(&mut self) -> bool {
        self.transition(SessionState::Dispatching)
    }

    /// Attaches a resolved location while the session is still active.
    ///
    /// A location is attached at most once; later fixes are ignored.
    pub(crate) fn attach_location(&mut self, location: Location) -> bool {
        if !self.state.is_active() || self.location.is_some() {
            return false;
        }
        self.location = Some(location);
        true
    }

    /// `Dispatching → Dispatched | Failed` according to the delivery summary.
    pub(crate) fn complete(&mut self, result: DispatchResult) -> bool {
        let next = result.terminal_state();
        if !self.transition(next) {
            return false;
        }
        if next == SessionState::Failed {
            self.failure = Some(FailureReason::AllDeliveriesFailed);
        }
        self.result = Some(result);
        true
    }

    /// `Dispatching → Failed` without a delivery summary.
    pub(crate) fn fail(&mut self, reason: FailureReason) -> bool {
        if !self.transition(SessionState::Failed) {
            return false;
        }
        self.failure = Some(reason);
        true
    }

    fn transition(&mut self, next: SessionState) -> bool {
        if !self.state.permits(next) {
            return false;
        }
        self.state = next;
        if next.is_terminal() {
            self.resolved_at = Some(SystemTime::now());
        }
        true
    }
}
