//! # Per-contact alert transport.
//!
//! [`AlertSender`] delivers one [`AlertMessage`] to one contact. The dispatch
//! service fans out over it; each call is independent and may fail on its own.
//!
//! Built-ins:
//! - [`SimulatedSender`] logs the alert and acknowledges it (no real transport).
//! - [`SenderFn`] wraps a closure, producing a fresh future per send.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::contacts::EmergencyContact;
use crate::dispatch::AlertMessage;
use crate::error::DeliveryError;

/// Shared handle to a sender.
pub type SenderRef = Arc<dyn AlertSender>;

/// # Delivers an alert to a single contact.
#[async_trait]
pub trait AlertSender: Send + Sync + 'static {
    /// Sends `alert` to `contact`; `Ok` means the contact acknowledged.
    async fn send(
        &self,
        contact: &EmergencyContact,
        alert: &AlertMessage,
    ) -> Result<(), DeliveryError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Sender that only logs; every contact acknowledges.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedSender;

#[async_trait]
impl AlertSender for SimulatedSender {
    async fn send(
        &self,
        contact: &EmergencyContact,
        alert: &AlertMessage,
    ) -> Result<(), DeliveryError> {
        tracing::info!(
            session = %alert.session,
            contact = %contact.id,
            phone = %contact.phone,
            body = %alert.body,
            "simulated alert delivery"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SimulatedSender"
    }
}

/// Function-backed sender.
///
/// ## Example
/// ```rust
/// use alertvisor::{AlertMessage, DeliveryError, EmergencyContact, SenderFn, SenderRef};
///
/// let sms: SenderRef = SenderFn::arc(|contact: EmergencyContact, _alert: AlertMessage| async move {
///     if contact.phone.is_empty() {
///         return Err(DeliveryError::failed("no phone number"));
///     }
///     Ok(())
/// });
/// ```
#[derive(Debug)]
pub struct SenderFn<F> {
    f: F,
}

impl<F> SenderFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the sender and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> AlertSender for SenderFn<F>
where
    F: Fn(EmergencyContact, AlertMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DeliveryError>> + Send + 'static,
{
    async fn send(
        &self,
        contact: &EmergencyContact,
        alert: &AlertMessage,
    ) -> Result<(), DeliveryError> {
        (self.f)(contact.clone(), alert.clone()).await
    }

    fn name(&self) -> &'static str {
        "SenderFn"
    }
}
