use std::collections::VecDeque;

use crate::session::{AlertSession, SessionId};

/// Bounded archive of terminal sessions (newest first).
///
/// A capacity of `0` disables archiving.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    capacity: usize,
    entries: VecDeque<AlertSession>,
}

impl SessionHistory {
    /// Creates an empty archive holding at most `capacity` sessions.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    /// Archives a terminal session, evicting the oldest when full.
    ///
    /// Non-terminal sessions are ignored.
    pub fn archive(&mut self, session: AlertSession) {
        if self.capacity == 0 || !session.state.is_terminal() {
            return;
        }
        self.entries.push_front(session);
        self.entries.truncate(self.capacity);
    }

    /// Looks up an archived session.
    pub fn get(&self, id: SessionId) -> Option<&AlertSession> {
        self.entries.iter().find(|s| s.id == id)
    }

    /// Returns a copy of the archive, newest first.
    pub fn snapshot(&self) -> Vec<AlertSession> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
