//! # Controller: the countdown state machine, run as a single task.
//!
//! Every input (calls from the UI, ticks, the location result, grace expiry,
//! delivery completion) is handled inside **one** `select!` loop, so handlers
//! never interleave and the session slot has exactly one writer.
//!
//! ```text
//!             ┌──────────────────────── select! (biased) ────────────────────────┐
//! token ─────►│ cancelled        → abandon lookup, exit                          │
//! commands ──►│ Trigger          → arm session, start ticker + LocationLookup    │
//!             │ Cancel           → Arming? Cancelled : Ignored(reason)           │
//!             │ History          → reply with archived sessions                  │
//! ticker ────►│ tick             → remaining -= 1; at 0 → Dispatching            │
//! lookup ────►│ fix / error      → attach location; ends the grace wait         │
//! grace ─────►│ expired          → abandon lookup, dispatch without location     │
//! delivery ──►│ DispatchResult   → Dispatched | Failed, archive                  │
//!             └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Commands are polled before ticks: a `cancel()` already queued when the last
//!   tick fires still wins.
//! - Reaching zero moves the session to `Dispatching` in the same handler, so no
//!   later `cancel()` can observe an `Arming` session with zero ticks left.
//! - The lookup is abandoned (never aborted) on cancel, on grace expiry and on shutdown.
//! - Commands keep being served while a dispatch is in flight.

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior, Sleep};
use tokio_util::sync::CancellationToken;

use crate::contacts::ContactRegistry;
use crate::core::Config;
use crate::dispatch::{DispatchResult, DispatchService};
use crate::error::{DispatchError, LocationError};
use crate::events::{Bus, Event, EventKind};
use crate::location::{Location, LocationLookup, LocationRef};
use crate::session::{AlertSession, FailureReason, SessionHistory, SessionId, SessionState};

use super::{
    command::{CancelOutcome, Command, TriggerOutcome},
    error::{ControlError, Rejection},
    slot::SessionSlot,
};

type Delivery = BoxFuture<'static, Result<DispatchResult, DispatchError>>;

/// Handle for driving the controller from the UI side.
///
/// Cheap to clone; every clone talks to the same controller task.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<Command>,
    slot: watch::Receiver<Option<AlertSession>>,
}

impl ControllerHandle {
    /// Starts a new session unless one is already active.
    pub async fn trigger(&self) -> Result<TriggerOutcome, ControlError> {
        self.request(|reply| Command::Trigger { reply }).await
    }

    /// Cancels the current session if it is still counting down.
    pub async fn cancel(&self) -> Result<CancelOutcome, ControlError> {
        self.request(|reply| Command::Cancel {
            session: None,
            reply,
        })
        .await
    }

    /// Cancels `session` only if it is still the current one.
    pub async fn cancel_session(&self, session: SessionId) -> Result<CancelOutcome, ControlError> {
        self.request(|reply| Command::Cancel {
            session: Some(session),
            reply,
        })
        .await
    }

    /// Archived terminal sessions, newest first.
    pub async fn history(&self) -> Result<Vec<AlertSession>, ControlError> {
        self.request(|reply| Command::History { reply }).await
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Option<AlertSession> {
        self.slot.borrow().clone()
    }

    /// State of the current session (`Idle` before the first trigger).
    pub fn state(&self) -> SessionState {
        self.slot
            .borrow()
            .as_ref()
            .map_or(SessionState::Idle, |s| s.state)
    }

    /// Receiver notified on every change of the current session.
    pub fn watch(&self) -> watch::Receiver<Option<AlertSession>> {
        self.slot.clone()
    }

    /// Waits until `session` is terminal and returns its final snapshot.
    ///
    /// Falls back to the history when a newer session already replaced it.
    pub async fn resolved(&self, session: SessionId) -> Result<AlertSession, ControlError> {
        let mut rx = self.slot.clone();
        let tracked = rx.borrow().as_ref().is_some_and(|s| s.id == session);

        if tracked {
            let last: Option<AlertSession> = rx
                .wait_for(|slot| {
                    slot.as_ref()
                        .is_none_or(|s| s.id != session || s.state.is_terminal())
                })
                .await
                .map_err(|_| ControlError::Closed)?
                .clone();
            if let Some(done) = last.filter(|s| s.id == session) {
                return Ok(done);
            }
        }

        self.request(|reply| Command::Archived { session, reply })
            .await?
            .ok_or(ControlError::UnknownSession { session })
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ControlError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| ControlError::Closed)?;
        rx.await.map_err(|_| ControlError::Closed)
    }
}

/// Collaborators the controller is wired with.
pub(crate) struct ControllerParts {
    pub cfg: Config,
    pub bus: Bus,
    pub contacts: Arc<ContactRegistry>,
    pub location: LocationRef,
    pub dispatch: Arc<DispatchService>,
}

/// Owner of the current-session slot.
pub(crate) struct Controller {
    cfg: Config,
    bus: Bus,
    contacts: Arc<ContactRegistry>,
    location: LocationRef,
    dispatch: Arc<DispatchService>,
    token: CancellationToken,

    slot: SessionSlot,
    history: SessionHistory,
    rx: mpsc::Receiver<Command>,

    // Suspension points of the current session.
    ticker: Option<Interval>,
    lookup: Option<LocationLookup>,
    grace: Option<Pin<Box<Sleep>>>,
    delivery: Option<Delivery>,
}

impl Controller {
    /// Spawns the controller task; it runs until `token` is cancelled.
    pub(crate) fn spawn(
        parts: ControllerParts,
        token: CancellationToken,
    ) -> (ControllerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(parts.cfg.command_capacity_clamped());
        let (slot, watch) = SessionSlot::new();

        let controller = Self {
            history: SessionHistory::new(parts.cfg.history_capacity),
            cfg: parts.cfg,
            bus: parts.bus,
            contacts: parts.contacts,
            location: parts.location,
            dispatch: parts.dispatch,
            token,
            slot,
            rx,
            ticker: None,
            lookup: None,
            grace: None,
            delivery: None,
        };
        let join = tokio::spawn(controller.run());

        (ControllerHandle { tx, slot: watch }, join)
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                _ = self.token.cancelled() => break,

                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => self.on_command(cmd),
                    None => break,
                },
                _ = next_tick(&mut self.ticker) => self.on_tick(),
                (session, res) = next_fix(&mut self.lookup) => self.on_location(session, res),
                _ = next_grace(&mut self.grace) => self.on_grace_expired(),
                res = next_resolution(&mut self.delivery) => self.on_delivered(res),
            }
        }

        if let Some(lookup) = self.lookup.take() {
            lookup.abandon();
        }
    }

    fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::Trigger { reply } => {
                let _ = reply.send(self.trigger());
            }
            Command::Cancel { session, reply } => {
                let _ = reply.send(self.cancel(session));
            }
            Command::History { reply } => {
                let _ = reply.send(self.history.snapshot());
            }
            Command::Archived { session, reply } => {
                let _ = reply.send(self.history.get(session).cloned());
            }
        }
    }

    fn trigger(&mut self) -> TriggerOutcome {
        if let Some(active) = self.slot.current().filter(|s| s.state.is_active()) {
            let reason = match active.state {
                SessionState::Arming => Rejection::AlreadyArming,
                _ => Rejection::AlreadyDispatching,
            };
            self.bus.publish(
                Event::new(EventKind::TriggerIgnored)
                    .with_session(active.id)
                    .with_reason(reason.as_label()),
            );
            return TriggerOutcome::Ignored {
                session: active.id,
                reason,
            };
        }

        let countdown = self.cfg.countdown_ticks();
        let session = AlertSession::arm(countdown);
        let id = session.id;
        self.slot.replace(session);
        self.bus.publish(
            Event::new(EventKind::SessionArmed)
                .with_session(id)
                .with_remaining(countdown),
        );

        let tick = self.cfg.tick_period();
        let mut ticker = time::interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);

        if let Some(stale) = self.lookup.take() {
            stale.abandon();
        }
        self.lookup = Some(LocationLookup::spawn(
            Arc::clone(&self.location),
            id,
            self.cfg.location_timeout(),
            &self.token,
            self.bus.clone(),
        ));

        TriggerOutcome::Armed(id)
    }

    fn cancel(&mut self, target: Option<SessionId>) -> CancelOutcome {
        let current = self.slot.current();
        let rejection = match &current {
            None => Some(Rejection::NoSession),
            Some(s) if target.is_some_and(|id| id != s.id) => Some(Rejection::StaleSession),
            Some(s) if s.state != SessionState::Arming => {
                Some(Rejection::NotArming { state: s.state })
            }
            Some(_) => None,
        };

        if let Some(reason) = rejection {
            let mut ev = Event::new(EventKind::CancelIgnored).with_reason(reason.as_label());
            if let Some(s) = &current {
                ev = ev.with_session(s.id);
            }
            self.bus.publish(ev);
            return CancelOutcome::Ignored(reason);
        }

        self.slot.update(AlertSession::cancel);
        self.ticker = None;
        if let Some(lookup) = self.lookup.take() {
            lookup.abandon();
        }

        let Some(cancelled) = self.slot.current() else {
            return CancelOutcome::Ignored(Rejection::NoSession);
        };
        self.bus.publish(
            Event::new(EventKind::SessionCancelled)
                .with_session(cancelled.id)
                .with_remaining(cancelled.seconds_remaining),
        );
        let id = cancelled.id;
        self.history.archive(cancelled);
        CancelOutcome::Cancelled(id)
    }

    fn on_tick(&mut self) {
        let mut remaining = None;
        self.slot.update(|s| {
            remaining = s.tick();
            remaining.is_some()
        });
        let (Some(remaining), Some(session)) = (remaining, self.slot.current()) else {
            self.ticker = None;
            return;
        };

        self.bus.publish(
            Event::new(EventKind::CountdownTick)
                .with_session(session.id)
                .with_remaining(remaining),
        );
        if remaining == 0 {
            self.ticker = None;
            self.begin_dispatch();
        }
    }

    /// `Arming → Dispatching`, then either dispatch now or wait for the grace period.
    fn begin_dispatch(&mut self) {
        if !self.slot.update(AlertSession::begin_dispatch) {
            return;
        }
        let Some(session) = self.slot.current() else {
            return;
        };
        self.bus
            .publish(Event::new(EventKind::DispatchStarted).with_session(session.id));

        if session.location.is_some() || self.lookup.is_none() {
            self.start_delivery(session);
            return;
        }

        let grace = self.cfg.grace_period();
        if grace.is_zero() {
            self.on_grace_expired();
        } else {
            self.grace = Some(Box::pin(time::sleep(grace)));
        }
    }

    fn on_location(&mut self, session: SessionId, res: Result<Location, LocationError>) {
        self.lookup = None;
        let Some(current) = self.slot.current().filter(|s| s.id == session) else {
            return;
        };

        match res {
            Ok(location) => {
                if self.slot.update(|s| s.attach_location(location)) {
                    self.bus.publish(
                        Event::new(EventKind::LocationResolved)
                            .with_session(session)
                            .with_location(location),
                    );
                }
            }
            Err(e) => {
                self.bus.publish(
                    Event::new(EventKind::LocationFailed)
                        .with_session(session)
                        .with_reason(e.as_label()),
                );
            }
        }

        if self.grace.take().is_some() && current.state == SessionState::Dispatching {
            if let Some(session) = self.slot.current() {
                self.start_delivery(session);
            }
        }
    }

    fn on_grace_expired(&mut self) {
        self.grace = None;
        if let Some(lookup) = self.lookup.take() {
            lookup.abandon();
        }
        let Some(session) = self.slot.current() else {
            return;
        };
        self.bus
            .publish(Event::new(EventKind::GraceExpired).with_session(session.id));
        self.start_delivery(session);
    }

    fn start_delivery(&mut self, session: AlertSession) {
        if let Some(lookup) = self.lookup.take() {
            lookup.abandon();
        }
        let dispatch = Arc::clone(&self.dispatch);
        let contacts = Arc::clone(&self.contacts);

        self.delivery = Some(
            async move {
                let list = contacts.snapshot().await;
                dispatch.dispatch(&session, &list).await
            }
            .boxed(),
        );
    }

    fn on_delivered(&mut self, res: Result<DispatchResult, DispatchError>) {
        self.delivery = None;
        let Some(session) = self.slot.current() else {
            return;
        };

        let event = match res {
            Ok(result) => {
                let kind = match result.terminal_state() {
                    SessionState::Dispatched => EventKind::SessionDispatched,
                    _ => EventKind::SessionFailed,
                };
                self.slot.update(|s| s.complete(result.clone()));
                let ev = Event::new(kind).with_result(result);
                match kind {
                    EventKind::SessionFailed => {
                        ev.with_reason(FailureReason::AllDeliveriesFailed.as_label())
                    }
                    _ => ev,
                }
            }
            Err(DispatchError::NoContacts) => {
                self.slot.update(|s| s.fail(FailureReason::NoContacts));
                Event::new(EventKind::SessionFailed)
                    .with_reason(FailureReason::NoContacts.as_label())
            }
            Err(e) => {
                tracing::warn!(session = %session.id, error = %e, "dispatch rejected");
                self.slot.update(|s| s.fail(FailureReason::Rejected));
                Event::new(EventKind::SessionFailed)
                    .with_reason(FailureReason::Rejected.as_label())
            }
        };

        self.bus.publish(event.with_session(session.id));
        if let Some(done) = self.slot.current().filter(|s| s.state.is_terminal()) {
            self.history.archive(done);
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => pending().await,
    }
}

async fn next_fix(
    lookup: &mut Option<LocationLookup>,
) -> (SessionId, Result<Location, LocationError>) {
    match lookup {
        Some(l) => {
            let res = l.finished().await;
            (l.session(), res)
        }
        None => pending().await,
    }
}

async fn next_grace(grace: &mut Option<Pin<Box<Sleep>>>) {
    match grace {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}

async fn next_resolution(delivery: &mut Option<Delivery>) -> Result<DispatchResult, DispatchError> {
    match delivery {
        Some(fut) => fut.await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::contacts::{ContactId, EmergencyContact};
    use crate::dispatch::{AlertMessage, SenderFn, SenderRef};
    use crate::error::DeliveryError;
    use crate::location::{LocationFn, NoLocation};

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn family() -> Vec<EmergencyContact> {
        vec![
            EmergencyContact::new("1", "Mom", "+1 (555) 123-4567", "Family"),
            EmergencyContact::new("2", "Dad", "+1 (555) 234-5678", "Family"),
            EmergencyContact::new("3", "Sarah", "+1 (555) 345-6789", "Friend"),
        ]
    }

    fn counting(sends: &Arc<AtomicUsize>) -> SenderRef {
        slow_counting(sends, Duration::ZERO)
    }

    fn slow_counting(sends: &Arc<AtomicUsize>, delay: Duration) -> SenderRef {
        let sends = Arc::clone(sends);
        SenderFn::arc(move |_c: EmergencyContact, _m: AlertMessage| {
            let sends = Arc::clone(&sends);
            async move {
                if !delay.is_zero() {
                    time::sleep(delay).await;
                }
                sends.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    fn located_after(after: Duration, at: Location) -> LocationRef {
        LocationFn::arc(move |_s: SessionId, _ctx: CancellationToken| async move {
            time::sleep(after).await;
            Ok::<_, LocationError>(at)
        })
    }

    fn start(
        contacts: Vec<EmergencyContact>,
        location: LocationRef,
        sender: SenderRef,
    ) -> (ControllerHandle, Bus) {
        let cfg = Config::default();
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let dispatch = Arc::new(DispatchService::new(
            sender,
            bus.clone(),
            cfg.delivery_timeout(),
        ));
        let parts = ControllerParts {
            cfg,
            bus: bus.clone(),
            contacts: Arc::new(ContactRegistry::with_contacts(contacts)),
            location,
            dispatch,
        };
        let (handle, _join) = Controller::spawn(parts, CancellationToken::new());
        (handle, bus)
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatches_once_after_countdown_with_location() {
        let sends = Arc::new(AtomicUsize::new(0));
        let here = Location::new(40.0, -73.0);
        let (handle, _bus) = start(family(), located_after(secs(1), here), counting(&sends));

        let started = Instant::now();
        let id = handle.trigger().await.unwrap().session_id();

        time::sleep(Duration::from_millis(1500)).await;
        let arming = handle.session().unwrap();
        assert_eq!(arming.state, SessionState::Arming);
        assert_eq!(arming.location, Some(here));

        let session = handle.resolved(id).await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= secs(5) && elapsed < secs(6), "{elapsed:?}");

        assert_eq!(session.state, SessionState::Dispatched);
        assert_eq!(session.location, Some(here));
        let result = session.result.unwrap();
        assert!(result.location_included);
        assert_eq!(result.delivered.len(), 3);
        assert_eq!(sends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_exactly_countdown_times() {
        let sends = Arc::new(AtomicUsize::new(0));
        let (handle, bus) = start(family(), Arc::new(NoLocation), counting(&sends));
        let mut rx = bus.subscribe();

        let id = handle.trigger().await.unwrap().session_id();
        handle.resolved(id).await.unwrap();

        let events = drain(&mut rx);
        let ticks: Vec<u32> = events
            .iter()
            .filter(|e| e.kind == EventKind::CountdownTick)
            .filter_map(|e| e.remaining)
            .collect();
        assert_eq!(ticks, vec![4, 3, 2, 1, 0]);

        let started = events
            .iter()
            .position(|e| e.kind == EventKind::DispatchStarted)
            .unwrap();
        let last_tick = events
            .iter()
            .rposition(|e| e.kind == EventKind::CountdownTick)
            .unwrap();
        assert!(started > last_tick);
        assert_eq!(
            events.iter().filter(|e| e.is_dispatch_outcome()).count(),
            1
        );
        assert_eq!(sends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_at_two_seconds_freezes_countdown() {
        let sends = Arc::new(AtomicUsize::new(0));
        let (handle, _bus) = start(family(), Arc::new(NoLocation), counting(&sends));

        let id = handle.trigger().await.unwrap().session_id();
        time::sleep(secs(2)).await;
        assert_eq!(handle.cancel().await.unwrap(), CancelOutcome::Cancelled(id));

        let frozen = handle.session().unwrap();
        assert_eq!(frozen.state, SessionState::Cancelled);
        assert!((3..=4).contains(&frozen.seconds_remaining));

        time::sleep(secs(10)).await;
        let later = handle.resolved(id).await.unwrap();
        assert_eq!(later.state, SessionState::Cancelled);
        assert_eq!(later.seconds_remaining, frozen.seconds_remaining);
        assert_eq!(sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_zero_never_dispatches() {
        let sends = Arc::new(AtomicUsize::new(0));
        let (handle, _bus) = start(family(), Arc::new(NoLocation), counting(&sends));
        let mut ids = HashSet::new();

        for k in 0..5 {
            let id = handle.trigger().await.unwrap().session_id();
            assert!(ids.insert(id));
            if k > 0 {
                time::sleep(secs(k)).await;
            }
            assert_eq!(handle.cancel().await.unwrap(), CancelOutcome::Cancelled(id));
        }

        time::sleep(secs(10)).await;
        assert_eq!(sends.load(Ordering::SeqCst), 0);
        assert_eq!(handle.history().await.unwrap().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_while_arming_is_absorbed() {
        let sends = Arc::new(AtomicUsize::new(0));
        let (handle, _bus) = start(family(), Arc::new(NoLocation), counting(&sends));

        let id = handle.trigger().await.unwrap().session_id();
        time::sleep(secs(1)).await;
        assert_eq!(
            handle.trigger().await.unwrap(),
            TriggerOutcome::Ignored {
                session: id,
                reason: Rejection::AlreadyArming
            }
        );

        handle.resolved(id).await.unwrap();
        assert_eq!(sends.load(Ordering::SeqCst), 3);
        assert_eq!(handle.history().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_and_cancel_while_dispatching_are_absorbed() {
        let sends = Arc::new(AtomicUsize::new(0));
        let (handle, _bus) = start(
            family(),
            Arc::new(NoLocation),
            slow_counting(&sends, secs(10)),
        );

        let id = handle.trigger().await.unwrap().session_id();
        time::sleep(secs(6)).await;
        assert_eq!(handle.state(), SessionState::Dispatching);
        assert_eq!(
            handle.trigger().await.unwrap(),
            TriggerOutcome::Ignored {
                session: id,
                reason: Rejection::AlreadyDispatching
            }
        );
        assert_eq!(
            handle.cancel().await.unwrap(),
            CancelOutcome::Ignored(Rejection::NotArming {
                state: SessionState::Dispatching
            })
        );

        let done = handle.resolved(id).await.unwrap();
        assert_eq!(done.state, SessionState::Dispatched);
        assert_eq!(sends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_around_zero_either_cancels_or_dispatches_once() {
        // (offset, expected): `None` means either side of the tie is acceptable.
        let cases = [(4999, Some(true)), (5000, None), (5001, Some(false))];

        for (ms, expect_cancelled) in cases {
            let sends = Arc::new(AtomicUsize::new(0));
            let (handle, bus) = start(family(), Arc::new(NoLocation), counting(&sends));
            let mut rx = bus.subscribe();

            let id = handle.trigger().await.unwrap().session_id();
            time::sleep(Duration::from_millis(ms)).await;
            let outcome = handle.cancel().await.unwrap();
            time::sleep(secs(10)).await;

            let events = drain(&mut rx);
            let started = events
                .iter()
                .filter(|e| e.kind == EventKind::DispatchStarted)
                .count();
            let session = handle.resolved(id).await.unwrap();

            match outcome {
                CancelOutcome::Cancelled(cancelled) => {
                    assert_ne!(expect_cancelled, Some(false), "ms={ms}");
                    assert_eq!(cancelled, id);
                    assert_eq!(session.state, SessionState::Cancelled);
                    assert_eq!(session.seconds_remaining, 1, "ms={ms}");
                    assert_eq!(started, 0, "ms={ms}");
                    assert_eq!(sends.load(Ordering::SeqCst), 0, "ms={ms}");
                }
                CancelOutcome::Ignored(Rejection::NotArming { .. }) => {
                    assert_ne!(expect_cancelled, Some(true), "ms={ms}");
                    assert_eq!(session.state, SessionState::Dispatched);
                    assert_eq!(started, 1, "ms={ms}");
                    assert_eq!(
                        events.iter().filter(|e| e.is_dispatch_outcome()).count(),
                        1
                    );
                    assert_eq!(sends.load(Ordering::SeqCst), 3, "ms={ms}");
                }
                other => panic!("ms={ms}: unexpected {other:?}"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_within_grace_is_included() {
        let sends = Arc::new(AtomicUsize::new(0));
        let here = Location::new(51.5, -0.12);
        let (handle, _bus) = start(
            family(),
            located_after(Duration::from_millis(5500), here),
            counting(&sends),
        );

        let id = handle.trigger().await.unwrap().session_id();
        let session = handle.resolved(id).await.unwrap();

        assert_eq!(session.location, Some(here));
        assert!(session.result.unwrap().location_included);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_location_is_discarded() {
        let sends = Arc::new(AtomicUsize::new(0));
        let (handle, bus) = start(
            family(),
            located_after(secs(7), Location::new(1.0, 2.0)),
            counting(&sends),
        );
        let mut rx = bus.subscribe();

        let id = handle.trigger().await.unwrap().session_id();
        let session = handle.resolved(id).await.unwrap();
        assert_eq!(session.state, SessionState::Dispatched);
        assert_eq!(session.location, None);
        assert!(!session.result.unwrap().location_included);

        time::sleep(secs(3)).await;
        let events = drain(&mut rx);
        assert!(events.iter().any(|e| e.kind == EventKind::GraceExpired));
        let discarded = events
            .iter()
            .find(|e| e.kind == EventKind::LocationDiscarded)
            .unwrap();
        assert_eq!(discarded.session, Some(id));
        assert_eq!(discarded.reason.as_deref(), Some("late_fix"));
        assert_eq!(handle.session().unwrap().location, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_contacts_fails_without_sending() {
        let sends = Arc::new(AtomicUsize::new(0));
        let (handle, _bus) = start(Vec::new(), Arc::new(NoLocation), counting(&sends));

        let id = handle.trigger().await.unwrap().session_id();
        let session = handle.resolved(id).await.unwrap();

        assert_eq!(session.state, SessionState::Failed);
        assert_eq!(session.failure, Some(FailureReason::NoContacts));
        assert_eq!(session.result, None);
        assert_eq!(sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_outcomes_decide_terminal_state() {
        let down = SenderFn::arc(|_c: EmergencyContact, _m: AlertMessage| async move {
            Err(DeliveryError::failed("network down"))
        });
        let (handle, _bus) = start(family(), Arc::new(NoLocation), down);
        let id = handle.trigger().await.unwrap().session_id();
        let failed = handle.resolved(id).await.unwrap();
        assert_eq!(failed.state, SessionState::Failed);
        assert_eq!(failed.failure, Some(FailureReason::AllDeliveriesFailed));

        let flaky = SenderFn::arc(|c: EmergencyContact, _m: AlertMessage| async move {
            if c.id.as_str() == "2" {
                Err(DeliveryError::failed("unreachable"))
            } else {
                Ok(())
            }
        });
        let (handle, _bus) = start(family(), Arc::new(NoLocation), flaky);
        let id = handle.trigger().await.unwrap().session_id();
        let partial = handle.resolved(id).await.unwrap();
        assert_eq!(partial.state, SessionState::Dispatched);
        assert_eq!(
            partial.result.unwrap().failed,
            BTreeSet::from([ContactId::from("2")])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_and_stale_cancel() {
        let sends = Arc::new(AtomicUsize::new(0));
        let (handle, _bus) = start(family(), Arc::new(NoLocation), counting(&sends));

        assert_eq!(
            handle.cancel().await.unwrap(),
            CancelOutcome::Ignored(Rejection::NoSession)
        );

        let first = handle.trigger().await.unwrap().session_id();
        handle.cancel().await.unwrap();
        let second = handle.trigger().await.unwrap().session_id();

        assert_eq!(
            handle.cancel_session(first).await.unwrap(),
            CancelOutcome::Ignored(Rejection::StaleSession)
        );
        assert_eq!(handle.state(), SessionState::Arming);

        handle.resolved(second).await.unwrap();
        let history: Vec<SessionId> = handle
            .history()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(history, vec![second, first]);

        assert_eq!(
            handle.resolved(first).await.unwrap().state,
            SessionState::Cancelled
        );
        let unknown = SessionId::new();
        assert_eq!(
            handle.resolved(unknown).await,
            Err(ControlError::UnknownSession { session: unknown })
        );
    }
}
