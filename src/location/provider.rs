//! # Location provider abstraction.
//!
//! A [`LocationProvider`] performs **one** best-effort position lookup per
//! session. The workflow never retries it: a failure just means the alert goes
//! out without coordinates.
//!
//! The provider receives a [`CancellationToken`] that is cancelled when the
//! workflow abandons the lookup (session cancelled, grace period expired,
//! shutdown). Honoring it is optional; a result produced after abandonment is
//! discarded by the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::LocationError;
use crate::location::Location;
use crate::session::SessionId;

/// Shared handle to a location provider.
pub type LocationRef = Arc<dyn LocationProvider>;

/// # Single-shot, fallible position lookup.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use alertvisor::{Location, LocationError, LocationProvider, SessionId};
///
/// struct Gps;
///
/// #[async_trait]
/// impl LocationProvider for Gps {
///     async fn acquire(&self, _session: SessionId, ctx: CancellationToken) -> Result<Location, LocationError> {
///         if ctx.is_cancelled() {
///             return Err(LocationError::Timeout);
///         }
///         Ok(Location::new(40.0, -73.0))
///     }
/// }
/// ```
#[async_trait]
pub trait LocationProvider: Send + Sync + 'static {
    /// Resolves the device position for `session`.
    async fn acquire(
        &self,
        session: SessionId,
        ctx: CancellationToken,
    ) -> Result<Location, LocationError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Provider for devices without positioning; always fails with `Unsupported`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn acquire(
        &self,
        _session: SessionId,
        _ctx: CancellationToken,
    ) -> Result<Location, LocationError> {
        Err(LocationError::Unsupported)
    }

    fn name(&self) -> &'static str {
        "NoLocation"
    }
}

/// Provider that immediately answers with a fixed position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Location);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn acquire(
        &self,
        _session: SessionId,
        _ctx: CancellationToken,
    ) -> Result<Location, LocationError> {
        Ok(self.0)
    }

    fn name(&self) -> &'static str {
        "FixedLocation"
    }
}
