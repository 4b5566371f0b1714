//! # ToastNotifier: user-facing notifications
//!
//! Maps workflow events to short [`Toast`]s and hands them to a [`ToastSink`]
//! (a UI, a console, a push channel). Events without a user-facing meaning
//! (ticks, per-contact outcomes, subscriber health) are skipped.
//!
//! | Event               | Level   | Message                                          |
//! |---------------------|---------|--------------------------------------------------|
//! | `SessionArmed`      | Error   | Emergency alert will be sent in N seconds!       |
//! | `SessionCancelled`  | Success | Emergency alert cancelled                        |
//! | `LocationFailed`    | Error   | Geolocation is not supported on this device / Unable to get your location |
//! | `SessionDispatched` | Success | Emergency alert sent to all contacts! (or X of Y)|
//! | `SessionFailed`     | Error   | No emergency contacts configured / Failed to send emergency alert |

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::session::FailureReason;
use crate::subscribers::Subscribe;

/// Severity of a toast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// A short user-facing notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Destination for toasts.
#[async_trait]
pub trait ToastSink: Send + Sync + 'static {
    async fn show(&self, toast: Toast);
}

/// Subscriber translating events into toasts.
pub struct ToastNotifier {
    sink: Arc<dyn ToastSink>,
}

impl ToastNotifier {
    /// Creates a notifier writing to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn ToastSink>) -> Self {
        Self { sink }
    }

    /// The toast for `event`, if it has one.
    pub fn toast_for(event: &Event) -> Option<Toast> {
        match event.kind {
            EventKind::SessionArmed => Some(Toast::new(
                ToastLevel::Error,
                format!(
                    "Emergency alert will be sent in {} seconds!",
                    event.remaining.unwrap_or_default()
                ),
            )),
            EventKind::SessionCancelled => {
                Some(Toast::new(ToastLevel::Success, "Emergency alert cancelled"))
            }
            EventKind::LocationFailed => {
                let message = if event.reason.as_deref() == Some("location_unsupported") {
                    "Geolocation is not supported on this device"
                } else {
                    "Unable to get your location"
                };
                Some(Toast::new(ToastLevel::Error, message))
            }
            EventKind::SessionDispatched => {
                let message = match event.result.as_deref() {
                    Some(r) if !r.is_complete() => format!(
                        "Emergency alert sent to {} of {} contacts",
                        r.delivered.len(),
                        r.attempted()
                    ),
                    _ => "Emergency alert sent to all contacts!".to_string(),
                };
                Some(Toast::new(ToastLevel::Success, message))
            }
            EventKind::SessionFailed => {
                let message = if event.reason.as_deref() == Some(FailureReason::NoContacts.as_label())
                {
                    "No emergency contacts configured"
                } else {
                    "Failed to send emergency alert"
                };
                Some(Toast::new(ToastLevel::Error, message))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl Subscribe for ToastNotifier {
    async fn on_event(&self, event: &Event) {
        if let Some(toast) = Self::toast_for(event) {
            self.sink.show(toast).await;
        }
    }

    fn name(&self) -> &'static str {
        "ToastNotifier"
    }

    fn accepts(&self, kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::SessionArmed
                | EventKind::SessionCancelled
                | EventKind::LocationFailed
                | EventKind::SessionDispatched
                | EventKind::SessionFailed
        )
    }

    fn queue_capacity(&self) -> usize {
        64
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::contacts::ContactId;
    use crate::dispatch::DispatchResult;
    use crate::session::SessionId;

    fn result(delivered: &[&str], failed: &[&str]) -> DispatchResult {
        let set = |ids: &[&str]| ids.iter().map(|id| ContactId::from(*id)).collect::<BTreeSet<_>>();
        DispatchResult {
            session_id: SessionId::new(),
            delivered: set(delivered),
            failed: set(failed),
            location_included: true,
        }
    }

    #[test]
    fn test_armed_toast_shows_countdown() {
        let ev = Event::new(EventKind::SessionArmed).with_remaining(5);
        assert_eq!(
            ToastNotifier::toast_for(&ev),
            Some(Toast::new(
                ToastLevel::Error,
                "Emergency alert will be sent in 5 seconds!"
            ))
        );
    }

    #[test]
    fn test_dispatch_toasts() {
        let all = Event::new(EventKind::SessionDispatched).with_result(result(&["1", "2"], &[]));
        assert_eq!(
            ToastNotifier::toast_for(&all).unwrap().message,
            "Emergency alert sent to all contacts!"
        );

        let partial =
            Event::new(EventKind::SessionDispatched).with_result(result(&["1", "3"], &["2"]));
        assert_eq!(
            ToastNotifier::toast_for(&partial).unwrap().message,
            "Emergency alert sent to 2 of 3 contacts"
        );

        let none = Event::new(EventKind::SessionFailed).with_reason("no_contacts");
        assert_eq!(
            ToastNotifier::toast_for(&none).unwrap().message,
            "No emergency contacts configured"
        );
    }

    #[test]
    fn test_location_toasts() {
        let unsupported = Event::new(EventKind::LocationFailed).with_reason("location_unsupported");
        assert_eq!(
            ToastNotifier::toast_for(&unsupported).unwrap().message,
            "Geolocation is not supported on this device"
        );
        let denied = Event::new(EventKind::LocationFailed).with_reason("location_denied");
        assert_eq!(
            ToastNotifier::toast_for(&denied).unwrap().message,
            "Unable to get your location"
        );
    }

    #[test]
    fn test_cancel_toast_is_success() {
        let ev = Event::new(EventKind::SessionCancelled).with_remaining(3);
        assert_eq!(
            ToastNotifier::toast_for(&ev),
            Some(Toast::new(ToastLevel::Success, "Emergency alert cancelled"))
        );
    }

    #[test]
    fn test_ticks_are_silent() {
        let ev = Event::new(EventKind::CountdownTick).with_remaining(3);
        assert_eq!(ToastNotifier::toast_for(&ev), None);
    }
}
