//! # AlertWorkflow: owns the bus, the subscriber fan-out and the controller task.
//!
//! ## High-level architecture
//! ```text
//! UI ── trigger()/cancel() ──► ControllerHandle ──► Controller task ──► DispatchService
//!                                                      │      │               │
//!                                          LocationLookup     SessionSlot (watch)
//!                                                      │                      │
//!                                                      ▼                      ▼
//!                         Bus ◄──────────── publish(Event) ◄──────────────────┘
//!                          │
//!                          └──► listener ──► SubscriberSet::emit(&Event)
//!                                              ┌─────────┬─────────┐
//!                                              ▼         ▼         ▼
//!                                        ToastNotifier LogWriter  ...
//!
//! Shutdown path:
//!   token.cancel()           → controller exits, in-flight lookup abandoned
//!   await controller task
//!   stop listener            → drain events already on the bus
//!   SubscriberSet::shutdown  → workers finish their queues
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use alertvisor::{AlertWorkflow, Config, EmergencyContact, FixedLocation, Location, SessionState};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         tick: Duration::from_millis(10),
//!         ..Config::default()
//!     };
//!     let workflow = AlertWorkflow::builder(cfg)
//!         .with_contacts(vec![EmergencyContact::new("1", "Mom", "+1 (555) 123-4567", "Family")])
//!         .with_location(Arc::new(FixedLocation(Location::new(40.0, -73.0))))
//!         .build();
//!
//!     let id = workflow.trigger().await?.session_id();
//!     let session = workflow.resolved(id).await?;
//!     assert_eq!(session.state, SessionState::Dispatched);
//!
//!     workflow.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::contacts::ContactRegistry;
use crate::controller::{CancelOutcome, ControlError, ControllerHandle, TriggerOutcome};
use crate::core::{Config, WorkflowBuilder};
use crate::events::{Bus, Event};
use crate::session::{AlertSession, SessionId, SessionState};
use crate::subscribers::SubscriberSet;

/// The emergency alert workflow.
pub struct AlertWorkflow {
    cfg: Config,
    bus: Bus,
    contacts: Arc<ContactRegistry>,
    handle: ControllerHandle,
    token: CancellationToken,
    controller: JoinHandle<()>,
    listener_stop: CancellationToken,
    listener: JoinHandle<()>,
}

impl AlertWorkflow {
    /// Returns a builder for configuring the workflow.
    pub fn builder(cfg: Config) -> WorkflowBuilder {
        WorkflowBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        contacts: Arc<ContactRegistry>,
        subs: SubscriberSet,
        handle: ControllerHandle,
        controller: JoinHandle<()>,
        token: CancellationToken,
    ) -> Self {
        let listener_stop = CancellationToken::new();
        let listener = subscriber_listener(bus.subscribe(), subs, listener_stop.clone());
        Self {
            cfg,
            bus,
            contacts,
            handle,
            token,
            controller,
            listener_stop,
            listener,
        }
    }

    /// Starts a new session unless one is already active.
    pub async fn trigger(&self) -> Result<TriggerOutcome, ControlError> {
        self.handle.trigger().await
    }

    /// Cancels the current session if it is still counting down.
    pub async fn cancel(&self) -> Result<CancelOutcome, ControlError> {
        self.handle.cancel().await
    }

    /// Cancels `session` only if it is still the current one.
    pub async fn cancel_session(&self, session: SessionId) -> Result<CancelOutcome, ControlError> {
        self.handle.cancel_session(session).await
    }

    /// Waits until `session` is terminal and returns its final snapshot.
    pub async fn resolved(&self, session: SessionId) -> Result<AlertSession, ControlError> {
        self.handle.resolved(session).await
    }

    /// Archived terminal sessions, newest first.
    pub async fn history(&self) -> Result<Vec<AlertSession>, ControlError> {
        self.handle.history().await
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Option<AlertSession> {
        self.handle.session()
    }

    /// State of the current session.
    pub fn state(&self) -> SessionState {
        self.handle.state()
    }

    /// Receiver notified on every change of the current session.
    pub fn watch(&self) -> watch::Receiver<Option<AlertSession>> {
        self.handle.watch()
    }

    /// A clonable handle to the controller (for UI components).
    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    /// The contact list; the profile collaborator edits it through this registry.
    pub fn contacts(&self) -> &Arc<ContactRegistry> {
        &self.contacts
    }

    /// Subscribes to the raw event stream.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// The configuration the workflow was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Stops the controller, then drains and stops the subscribers.
    ///
    /// An in-flight location lookup is abandoned; an in-flight delivery is dropped.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.controller.await {
            tracing::warn!(error = %e, "controller task ended abnormally");
        }
        self.listener_stop.cancel();
        if let Err(e) = self.listener.await {
            tracing::warn!(error = %e, "subscriber listener ended abnormally");
        }
    }
}

/// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
///
/// On stop, drains what is already on the bus, then shuts the set down.
fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    stop: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                ev = rx.recv() => match ev {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = stop.cancelled() => break,
            }
        }

        while let Ok(ev) = rx.try_recv() {
            set.emit(&ev);
        }
        set.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::contacts::{ContactId, EmergencyContact};
    use crate::location::{FixedLocation, Location};
    use crate::session::FailureReason;
    use crate::subscribers::{Subscribe, Toast, ToastNotifier, ToastSink};

    #[derive(Default)]
    struct Recorder {
        toasts: Mutex<Vec<Toast>>,
    }

    #[async_trait]
    impl ToastSink for Recorder {
        async fn show(&self, toast: Toast) {
            self.toasts.lock().unwrap().push(toast);
        }
    }

    impl Recorder {
        fn messages(&self) -> Vec<String> {
            self.toasts
                .lock()
                .unwrap()
                .iter()
                .map(|t| t.message.clone())
                .collect()
        }
    }

    fn family() -> Vec<EmergencyContact> {
        vec![
            EmergencyContact::new("1", "Mom", "+1 (555) 123-4567", "Family"),
            EmergencyContact::new("2", "Dad", "+1 (555) 234-5678", "Family"),
            EmergencyContact::new("3", "Sarah", "+1 (555) 345-6789", "Friend"),
        ]
    }

    fn build(recorder: &Arc<Recorder>) -> AlertWorkflow {
        let toasts: Arc<dyn Subscribe> = Arc::new(ToastNotifier::new(recorder.clone()));
        AlertWorkflow::builder(Config::default())
            .with_subscribers(vec![toasts])
            .with_contacts(family())
            .with_location(Arc::new(FixedLocation(Location::new(40.0, -73.0))))
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_toasts() {
        let recorder = Arc::new(Recorder::default());
        let workflow = build(&recorder);

        let id = workflow.trigger().await.unwrap().session_id();
        let session = workflow.resolved(id).await.unwrap();
        assert_eq!(session.state, SessionState::Dispatched);
        assert_eq!(session.result.unwrap().delivered.len(), 3);

        workflow.shutdown().await;
        assert_eq!(
            recorder.messages(),
            vec![
                "Emergency alert will be sent in 5 seconds!".to_string(),
                "Emergency alert sent to all contacts!".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_toast() {
        let recorder = Arc::new(Recorder::default());
        let workflow = build(&recorder);

        workflow.trigger().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(
            workflow.cancel().await.unwrap(),
            CancelOutcome::Cancelled(_)
        ));

        workflow.shutdown().await;
        assert_eq!(
            recorder.messages().last().map(String::as_str),
            Some("Emergency alert cancelled")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_contacts_fail_the_next_session() {
        let recorder = Arc::new(Recorder::default());
        let workflow = build(&recorder);

        for id in ["1", "2", "3"] {
            workflow
                .contacts()
                .remove(&ContactId::from(id))
                .await
                .unwrap();
        }

        let id = workflow.trigger().await.unwrap().session_id();
        let session = workflow.resolved(id).await.unwrap();
        assert_eq!(session.state, SessionState::Failed);
        assert_eq!(session.failure, Some(FailureReason::NoContacts));

        workflow.shutdown().await;
        assert_eq!(
            recorder.messages().last().map(String::as_str),
            Some("No emergency contacts configured")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_handles() {
        let recorder = Arc::new(Recorder::default());
        let workflow = build(&recorder);
        let handle = workflow.handle();

        workflow.trigger().await.unwrap();
        workflow.shutdown().await;

        assert_eq!(handle.trigger().await, Err(ControlError::Closed));
        assert_eq!(handle.state(), SessionState::Arming);
    }
}
