//! # LogWriter: structured event logger
//!
//! A minimal subscriber that forwards incoming [`Event`]s to `tracing`.
//! Use it for demos or when the host app already installs a `tracing` subscriber.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO  armed session=5b1c.. remaining=5
//! DEBUG tick session=5b1c.. remaining=4
//! INFO  location-resolved session=5b1c.. location=40.000000, -73.000000
//! INFO  dispatch-started session=5b1c..
//! INFO  contact-delivered session=5b1c.. contact=1
//! WARN  contact-failed session=5b1c.. contact=2 reason="delivery failed: unreachable"
//! INFO  dispatched session=5b1c.. delivered=2 failed=1
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let session = e.session.map(|s| s.to_string()).unwrap_or_default();
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::SessionArmed => {
                tracing::info!(%session, remaining = ?e.remaining, "armed");
            }
            EventKind::CountdownTick => {
                tracing::debug!(%session, remaining = ?e.remaining, "tick");
            }
            EventKind::TriggerIgnored => {
                tracing::debug!(%session, reason, "trigger-ignored");
            }
            EventKind::CancelIgnored => {
                tracing::debug!(%session, reason, "cancel-ignored");
            }
            EventKind::SessionCancelled => {
                tracing::info!(%session, remaining = ?e.remaining, "cancelled");
            }
            EventKind::LocationResolved => {
                let location = e.location.map(|l| l.to_string()).unwrap_or_default();
                tracing::info!(%session, %location, "location-resolved");
            }
            EventKind::LocationFailed => {
                tracing::warn!(%session, reason, "location-failed");
            }
            EventKind::LocationDiscarded => {
                tracing::info!(%session, reason, "location-discarded");
            }
            EventKind::GraceExpired => {
                tracing::info!(%session, "grace-expired");
            }
            EventKind::DispatchStarted => {
                tracing::info!(%session, "dispatch-started");
            }
            EventKind::ContactDelivered => {
                let contact = e.contact.as_ref().map(|c| c.to_string()).unwrap_or_default();
                tracing::info!(%session, %contact, "contact-delivered");
            }
            EventKind::ContactFailed => {
                let contact = e.contact.as_ref().map(|c| c.to_string()).unwrap_or_default();
                tracing::warn!(%session, %contact, reason, "contact-failed");
            }
            EventKind::SessionDispatched => {
                let (delivered, failed) = counts(e);
                tracing::info!(%session, delivered, failed, "dispatched");
            }
            EventKind::SessionFailed => {
                let (delivered, failed) = counts(e);
                tracing::error!(%session, reason, delivered, failed, "failed");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(reason, "subscriber-overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(reason, "subscriber-panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

fn counts(e: &Event) -> (usize, usize) {
    e.result
        .as_ref()
        .map(|r| (r.delivered.len(), r.failed.len()))
        .unwrap_or((0, 0))
}
