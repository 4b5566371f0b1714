//! # DispatchService: at-most-once fan-out of one alert.
//!
//! ```text
//! dispatch(session, contacts)
//!   ├─► session.state != Dispatching          → Err(NotDispatching)
//!   ├─► ledger claim(session.id)
//!   │      ├─ already Dispatching             → Err(AlreadyDispatching)
//!   │      └─ already Done                    → Err(AlreadyDispatched)
//!   ├─► contacts empty                        → mark Done, Err(NoContacts)
//!   ├─► compose AlertMessage once
//!   ├─► join_all(send per contact)            (independent, order-insensitive)
//!   │      ├─ Ok   → publish ContactDelivered → delivered
//!   │      └─ Err  → publish ContactFailed    → failed
//!   └─► mark Done, Ok(DispatchResult)
//! ```
//!
//! ## Rules
//! - The ledger entry is claimed **before** any send and never released, so a
//!   session id is sent at most once, even if the first dispatch is dropped midway.
//! - Only the newest `capacity` finished ids are remembered; in-flight claims stay
//!   until they finish. Session ids are never reused, so an evicted id cannot come back.
//! - A per-contact failure never prevents delivery to the others.
//! - `DispatchResult::terminal_state()` decides Dispatched vs Failed; the
//!   service itself never mutates the session.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::time;

use crate::contacts::EmergencyContact;
use crate::dispatch::{AlertMessage, DispatchResult, SenderRef};
use crate::error::{DeliveryError, DispatchError};
use crate::events::{Bus, Event, EventKind};
use crate::session::{AlertSession, SessionId, SessionState};

/// Per-session dispatch phase recorded by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Dispatching,
    Done,
}

/// Default number of finished session ids kept by the ledger.
const DEFAULT_LEDGER_CAPACITY: usize = 256;

/// Claimed session ids plus the order in which they finished.
#[derive(Debug, Default)]
struct Ledger {
    phases: HashMap<SessionId, Phase>,
    finished: VecDeque<SessionId>,
}

/// Fans one alert out to a contact list, at most once per session.
pub struct DispatchService {
    sender: SenderRef,
    bus: Bus,
    delivery_timeout: Option<Duration>,
    capacity: usize,
    ledger: Mutex<Ledger>,
}

impl DispatchService {
    /// Creates a service sending through `sender`.
    ///
    /// `delivery_timeout` bounds each per-contact send (`None` = unbounded).
    pub fn new(sender: SenderRef, bus: Bus, delivery_timeout: Option<Duration>) -> Self {
        Self {
            sender,
            bus,
            delivery_timeout,
            capacity: DEFAULT_LEDGER_CAPACITY,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Limits how many finished session ids are remembered (min 1).
    #[must_use]
    pub fn with_ledger_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Sends the alert of `session` to every contact.
    pub async fn dispatch(
        &self,
        session: &AlertSession,
        contacts: &[EmergencyContact],
    ) -> Result<DispatchResult, DispatchError> {
        if session.state != SessionState::Dispatching {
            return Err(DispatchError::NotDispatching {
                state: session.state,
            });
        }
        self.claim(session.id).await?;

        if contacts.is_empty() {
            self.mark_done(session.id).await;
            return Err(DispatchError::NoContacts);
        }

        let message = AlertMessage::compose(session);
        let outcomes = join_all(
            contacts
                .iter()
                .map(|contact| self.deliver(contact, &message)),
        )
        .await;

        let mut delivered = BTreeSet::new();
        let mut failed = BTreeSet::new();
        for (contact, outcome) in contacts.iter().zip(outcomes) {
            match outcome {
                Ok(()) => delivered.insert(contact.id.clone()),
                Err(_) => failed.insert(contact.id.clone()),
            };
        }

        self.mark_done(session.id).await;
        Ok(DispatchResult {
            session_id: session.id,
            delivered,
            failed,
            location_included: message.location.is_some(),
        })
    }

    async fn claim(&self, session: SessionId) -> Result<(), DispatchError> {
        let mut ledger = self.ledger.lock().await;
        match ledger.phases.get(&session) {
            Some(Phase::Dispatching) => Err(DispatchError::AlreadyDispatching { session }),
            Some(Phase::Done) => Err(DispatchError::AlreadyDispatched { session }),
            None => {
                ledger.phases.insert(session, Phase::Dispatching);
                Ok(())
            }
        }
    }

    async fn mark_done(&self, session: SessionId) {
        let mut ledger = self.ledger.lock().await;
        ledger.phases.insert(session, Phase::Done);
        ledger.finished.push_back(session);
        while ledger.finished.len() > self.capacity {
            if let Some(old) = ledger.finished.pop_front() {
                ledger.phases.remove(&old);
            }
        }
    }

    /// Sends to one contact and publishes the outcome.
    async fn deliver(
        &self,
        contact: &EmergencyContact,
        message: &AlertMessage,
    ) -> Result<(), DeliveryError> {
        let res = match self.delivery_timeout.filter(|d| *d > Duration::ZERO) {
            Some(dur) => match time::timeout(dur, self.sender.send(contact, message)).await {
                Ok(r) => r,
                Err(_elapsed) => Err(DeliveryError::Timeout { timeout: dur }),
            },
            None => self.sender.send(contact, message).await,
        };

        let ev = match &res {
            Ok(()) => Event::new(EventKind::ContactDelivered),
            Err(e) => {
                tracing::debug!(
                    sender = self.sender.name(),
                    contact = %contact.id,
                    error = %e,
                    "delivery failed"
                );
                Event::new(EventKind::ContactFailed).with_reason(e.to_string())
            }
        };
        self.bus.publish(
            ev.with_session(message.session)
                .with_contact(contact.id.clone()),
        );
        res
    }
}
