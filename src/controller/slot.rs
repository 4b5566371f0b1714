use tokio::sync::watch;

use crate::session::AlertSession;

/// The "current session" slot.
///
/// Only the controller task holds the sender; everybody else reads snapshots
/// through a `watch::Receiver`.
pub(super) struct SessionSlot {
    tx: watch::Sender<Option<AlertSession>>,
}

impl SessionSlot {
    /// Creates an empty slot and its first reader.
    pub fn new() -> (Self, watch::Receiver<Option<AlertSession>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Option<AlertSession> {
        self.tx.borrow().clone()
    }

    /// Installs a new session, replacing the previous (terminal) one.
    pub fn replace(&self, session: AlertSession) {
        self.tx.send_replace(Some(session));
    }

    /// Mutates the current session in place.
    ///
    /// Readers are notified only when `f` reports a change.
    pub fn update(&self, f: impl FnOnce(&mut AlertSession) -> bool) -> bool {
        self.tx
            .send_if_modified(|slot| slot.as_mut().is_some_and(f))
    }
}
