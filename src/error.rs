//! Error types used by the alert workflow.
//!
//! This module defines the error enums raised by the workflow's collaborators:
//!
//! - [`LocationError`]: a location lookup failed (non-fatal, dispatch proceeds without location).
//! - [`DeliveryError`]: sending the alert to one contact failed (partial failure).
//! - [`DispatchError`]: the dispatch itself was refused (`NoContacts` or an at-most-once guard).
//! - [`ContactError`]: a contact registry edit was refused.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging.

use std::time::Duration;
use thiserror::Error;

use crate::contacts::ContactId;
use crate::session::{SessionId, SessionState};

/// # Errors produced by a location lookup.
///
/// None of these abort the workflow: the session simply keeps no location
/// and the alert is dispatched without coordinates.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The device offers no positioning capability.
    #[error("location capability unsupported")]
    Unsupported,

    /// The user (or platform) denied the location permission.
    #[error("location permission denied")]
    Denied,

    /// The lookup did not produce a position in time.
    #[error("location lookup timed out")]
    Timeout,

    /// A position could not be determined for another reason.
    #[error("location unavailable: {reason}")]
    Unavailable {
        /// Provider-supplied detail.
        reason: String,
    },
}

impl LocationError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use alertvisor::LocationError;
    ///
    /// assert_eq!(LocationError::Denied.as_label(), "location_denied");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LocationError::Unsupported => "location_unsupported",
            LocationError::Denied => "location_denied",
            LocationError::Timeout => "location_timeout",
            LocationError::Unavailable { .. } => "location_unavailable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LocationError::Unavailable { reason } => format!("unavailable: {reason}"),
            other => other.to_string(),
        }
    }
}

/// # Failure to deliver the alert to a single contact.
///
/// Recorded in [`DispatchResult::failed`](crate::DispatchResult::failed);
/// never fails the whole session on its own.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The transport refused or could not complete the send.
    #[error("delivery failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The send exceeded the configured per-contact timeout.
    #[error("delivery timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },
}

impl DeliveryError {
    /// Convenience constructor for [`DeliveryError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        DeliveryError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::Failed { .. } => "delivery_failed",
            DeliveryError::Timeout { .. } => "delivery_timeout",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DeliveryError::Failed { error } => format!("error: {error}"),
            DeliveryError::Timeout { timeout } => format!("timeout: {timeout:?}"),
        }
    }
}

/// # Errors produced by [`DispatchService::dispatch`](crate::DispatchService::dispatch).
///
/// `NoContacts` is fatal to the session. The remaining variants are
/// at-most-once guard rejections: the dispatch was not attempted.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The contact list was empty; nothing was sent.
    #[error("no emergency contacts registered")]
    NoContacts,

    /// The session snapshot is not in the `Dispatching` state.
    #[error("session is {state:?}, not dispatching")]
    NotDispatching {
        /// State carried by the rejected snapshot.
        state: SessionState,
    },

    /// Another dispatch for this session is in flight.
    #[error("session {session} is already dispatching")]
    AlreadyDispatching {
        /// The guarded session.
        session: SessionId,
    },

    /// This session has already been dispatched.
    #[error("session {session} was already dispatched")]
    AlreadyDispatched {
        /// The guarded session.
        session: SessionId,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use alertvisor::DispatchError;
    ///
    /// assert_eq!(DispatchError::NoContacts.as_label(), "dispatch_no_contacts");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::NoContacts => "dispatch_no_contacts",
            DispatchError::NotDispatching { .. } => "dispatch_not_dispatching",
            DispatchError::AlreadyDispatching { .. } => "dispatch_already_dispatching",
            DispatchError::AlreadyDispatched { .. } => "dispatch_already_dispatched",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }

    /// True for at-most-once guard rejections (the dispatch was never attempted
    /// because another one owns the session).
    pub fn is_guard(&self) -> bool {
        matches!(
            self,
            DispatchError::AlreadyDispatching { .. } | DispatchError::AlreadyDispatched { .. }
        )
    }
}

/// # Errors produced by [`ContactRegistry`](crate::ContactRegistry) edits.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// A contact with this id is already registered.
    #[error("contact {id} already exists")]
    Duplicate {
        /// The conflicting id.
        id: ContactId,
    },

    /// No contact with this id is registered.
    #[error("contact {id} not found")]
    NotFound {
        /// The missing id.
        id: ContactId,
    },
}

impl ContactError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ContactError::Duplicate { .. } => "contact_duplicate",
            ContactError::NotFound { .. } => "contact_not_found",
        }
    }
}
