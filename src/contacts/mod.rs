//! # Emergency contacts.
//!
//! - [`EmergencyContact`] / [`ContactId`] the contact record
//! - [`ContactUpdate`] partial edit used by the profile collaborator
//! - [`ContactRegistry`] ordered copy-on-write store read by the dispatch path

mod contact;
mod registry;

pub use contact::{ContactId, ContactUpdate, EmergencyContact};
pub use registry::ContactRegistry;
