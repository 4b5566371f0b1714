//! # Session lifecycle states.
//!
//! ```text
//!            trigger()             tick → 0
//!   Idle ───────────────► Arming ───────────► Dispatching ──┬──► Dispatched
//!                            │                              └──► Failed
//!                            │ cancel()
//!                            ▼
//!                        Cancelled
//! ```
//!
//! `Cancelled`, `Dispatched` and `Failed` are terminal. A new trigger from a
//! terminal state creates a fresh session instead of reviving the old one.

/// State of one [`AlertSession`](crate::AlertSession).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session exists (reported by an empty slot).
    Idle,
    /// Countdown running; cancel is accepted.
    Arming,
    /// Cancelled before the countdown reached zero.
    Cancelled,
    /// Countdown reached zero; waiting for location grace and delivery.
    Dispatching,
    /// Delivered to at least one contact.
    Dispatched,
    /// Nothing delivered (no contacts, or every contact failed).
    Failed,
}

impl SessionState {
    /// True for `Arming` and `Dispatching`: at most one session may be here.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Arming | SessionState::Dispatching)
    }

    /// True for `Cancelled`, `Dispatched` and `Failed`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Cancelled | SessionState::Dispatched | SessionState::Failed
        )
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn permits(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Arming)
                | (Arming, Cancelled)
                | (Arming, Dispatching)
                | (Dispatching, Dispatched)
                | (Dispatching, Failed)
        )
    }

    /// Short snake_case label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Arming => "arming",
            SessionState::Cancelled => "cancelled",
            SessionState::Dispatching => "dispatching",
            SessionState::Dispatched => "dispatched",
            SessionState::Failed => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SessionState::*;
    use super::*;

    const ALL: [SessionState; 6] = [Idle, Arming, Cancelled, Dispatching, Dispatched, Failed];

    #[test]
    fn test_terminal_states_permit_nothing() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.permits(to), "{from:?} -> {to:?} must be refused");
            }
        }
    }

    #[test]
    fn test_cancel_only_from_arming() {
        for from in ALL {
            assert_eq!(from.permits(Cancelled), from == Arming);
        }
    }

    #[test]
    fn test_dispatch_outcomes_only_from_dispatching() {
        for from in ALL {
            assert_eq!(from.permits(Dispatched), from == Dispatching);
            assert_eq!(from.permits(Failed), from == Dispatching);
        }
    }

    #[test]
    fn test_active_and_terminal_are_disjoint() {
        for s in ALL {
            assert!(!(s.is_active() && s.is_terminal()));
        }
        assert!(!Idle.is_active() && !Idle.is_terminal());
    }
}
