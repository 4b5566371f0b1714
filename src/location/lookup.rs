//! # One location lookup attempt, run as its own task.
//!
//! ```text
//! spawn(provider, session, timeout)
//!   └─► tokio::spawn
//!         ├─► attempt token = abandon.child_token()
//!         ├─► provider.acquire(session, attempt)   (optionally wrapped in time::timeout)
//!         │       └─ timeout → cancel attempt → Err(Timeout)
//!         └─► if abandoned → publish LocationDiscarded, result dropped
//!
//! finished()  ─► awaits the task; panics map to Unavailable
//! abandon()   ─► cancels the abandon token and detaches the task (never aborts it)
//! ```
//!
//! ## Rules
//! - Exactly **one** attempt per session; no retry.
//! - Abandonment is cooperative: the provider keeps running until it returns.
//! - A result produced after abandonment is reported as `LocationDiscarded` and nowhere else.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::LocationError;
use crate::events::{Bus, Event, EventKind};
use crate::location::{Location, LocationProvider, LocationRef};
use crate::session::SessionId;

/// Handle to an in-flight lookup owned by the controller.
pub(crate) struct LocationLookup {
    session: SessionId,
    join: JoinHandle<Result<Location, LocationError>>,
    abandon: CancellationToken,
}

impl LocationLookup {
    /// Starts the lookup for `session`.
    ///
    /// `parent` is the workflow token: shutting the workflow down abandons the lookup too.
    pub(crate) fn spawn(
        provider: LocationRef,
        session: SessionId,
        timeout: Option<Duration>,
        parent: &CancellationToken,
        bus: Bus,
    ) -> Self {
        let abandon = parent.child_token();
        let ctx = abandon.clone();

        let join = tokio::spawn(async move {
            let res = acquire_once(provider.as_ref(), session, &ctx, timeout).await;
            if let Err(e) = &res {
                tracing::debug!(provider = provider.name(), %session, error = %e, "location lookup failed");
            }
            if ctx.is_cancelled() {
                publish_discarded(&bus, session, &res);
            }
            res
        });

        Self {
            session,
            join,
            abandon,
        }
    }

    pub(crate) fn session(&self) -> SessionId {
        self.session
    }

    /// Waits for the attempt to finish.
    ///
    /// Must not be polled again once it returned; the caller drops the lookup instead.
    pub(crate) async fn finished(&mut self) -> Result<Location, LocationError> {
        match (&mut self.join).await {
            Ok(res) => res,
            Err(e) if e.is_panic() => Err(LocationError::Unavailable {
                reason: "location provider panicked".into(),
            }),
            Err(_) => Err(LocationError::Unavailable {
                reason: "location lookup aborted".into(),
            }),
        }
    }

    /// Gives up on the lookup without terminating it.
    pub(crate) fn abandon(self) {
        self.abandon.cancel();
    }
}

/// Executes a single provider attempt with optional timeout.
///
/// The attempt gets its own child token so that a timeout is not mistaken for
/// abandonment.
async fn acquire_once(
    provider: &dyn LocationProvider,
    session: SessionId,
    abandon: &CancellationToken,
    timeout: Option<Duration>,
) -> Result<Location, LocationError> {
    let attempt = abandon.child_token();

    if let Some(dur) = timeout.filter(|d| *d > Duration::ZERO) {
        match time::timeout(dur, provider.acquire(session, attempt.clone())).await {
            Ok(res) => res,
            Err(_elapsed) => {
                attempt.cancel();
                Err(LocationError::Timeout)
            }
        }
    } else {
        provider.acquire(session, attempt).await
    }
}

fn publish_discarded(bus: &Bus, session: SessionId, res: &Result<Location, LocationError>) {
    let ev = Event::new(EventKind::LocationDiscarded).with_session(session);
    let ev = match res {
        Ok(location) => ev.with_location(*location).with_reason("late_fix"),
        Err(e) => ev.with_reason(e.as_label()),
    };
    bus.publish(ev);
}
