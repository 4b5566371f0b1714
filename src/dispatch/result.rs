use std::collections::BTreeSet;

use crate::contacts::ContactId;
use crate::session::{SessionId, SessionState};

/// Delivery summary of one dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchResult {
    pub session_id: SessionId,
    /// Contacts that acknowledged the alert.
    pub delivered: BTreeSet<ContactId>,
    /// Contacts the alert could not be delivered to.
    pub failed: BTreeSet<ContactId>,
    /// Whether the alert carried coordinates.
    pub location_included: bool,
}

impl DispatchResult {
    /// `Dispatched` if at least one contact acknowledged, otherwise `Failed`.
    pub fn terminal_state(&self) -> SessionState {
        if self.delivered.is_empty() {
            SessionState::Failed
        } else {
            SessionState::Dispatched
        }
    }

    /// True when every contact acknowledged.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.delivered.is_empty()
    }

    /// Number of contacts an alert was sent to.
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}
