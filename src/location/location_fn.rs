//! # Function-backed location provider (`LocationFn`)
//!
//! [`LocationFn`] wraps a closure `F: Fn(SessionId, CancellationToken) -> Fut`,
//! producing a fresh future per lookup. Shared state, if any, must be captured
//! explicitly (e.g. an `Arc<...>` moved into the closure).
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use alertvisor::{Location, LocationError, LocationFn, LocationRef, SessionId};
//!
//! let gps: LocationRef = LocationFn::arc(|_session: SessionId, _ctx: CancellationToken| async move {
//!     Ok::<_, LocationError>(Location::new(40.0, -73.0))
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::LocationError;
use crate::location::{Location, LocationProvider};
use crate::session::SessionId;

/// Function-backed provider implementation.
#[derive(Debug)]
pub struct LocationFn<F> {
    f: F,
}

impl<F> LocationFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the provider and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> LocationProvider for LocationFn<F>
where
    F: Fn(SessionId, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Location, LocationError>> + Send + 'static,
{
    async fn acquire(
        &self,
        session: SessionId,
        ctx: CancellationToken,
    ) -> Result<Location, LocationError> {
        (self.f)(session, ctx).await
    }

    fn name(&self) -> &'static str {
        "LocationFn"
    }
}
