//! # Contact registry.
//!
//! Ordered list of emergency contacts. The profile collaborator edits it; the
//! alert workflow only ever takes [`snapshot`](ContactRegistry::snapshot)s.
//!
//! ## Rules
//! - Insertion order is preserved (alerts fan out order-insensitively, but the UI lists contacts in order).
//! - Ids are unique; `add` refuses duplicates.
//! - A snapshot is an immutable `Arc<[EmergencyContact]>`: edits made after it
//!   was taken never show up in it (copy-on-write).

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::contacts::{ContactId, ContactUpdate, EmergencyContact};
use crate::error::ContactError;

/// Copy-on-write store of emergency contacts.
pub struct ContactRegistry {
    contacts: RwLock<Arc<[EmergencyContact]>>,
}

impl ContactRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::with_contacts(Vec::new())
    }

    /// Creates a registry seeded with `contacts`.
    ///
    /// Later duplicates of an id are dropped.
    pub fn with_contacts(contacts: Vec<EmergencyContact>) -> Self {
        let mut unique: Vec<EmergencyContact> = Vec::with_capacity(contacts.len());
        for c in contacts {
            if !unique.iter().any(|u| u.id == c.id) {
                unique.push(c);
            }
        }
        Self {
            contacts: RwLock::new(unique.into()),
        }
    }

    /// Returns an immutable view of the current list.
    pub async fn snapshot(&self) -> Arc<[EmergencyContact]> {
        Arc::clone(&*self.contacts.read().await)
    }

    /// Returns a copy of one contact.
    pub async fn get(&self, id: &ContactId) -> Option<EmergencyContact> {
        self.contacts
            .read()
            .await
            .iter()
            .find(|c| &c.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.contacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contacts.read().await.is_empty()
    }

    /// Appends a contact.
    pub async fn add(&self, contact: EmergencyContact) -> Result<(), ContactError> {
        let mut guard = self.contacts.write().await;
        if guard.iter().any(|c| c.id == contact.id) {
            return Err(ContactError::Duplicate { id: contact.id });
        }
        let mut next = guard.to_vec();
        next.push(contact);
        *guard = next.into();
        Ok(())
    }

    /// Applies a partial edit and returns the updated contact.
    pub async fn update(
        &self,
        id: &ContactId,
        update: ContactUpdate,
    ) -> Result<EmergencyContact, ContactError> {
        let mut guard = self.contacts.write().await;
        let Some(pos) = guard.iter().position(|c| &c.id == id) else {
            return Err(ContactError::NotFound { id: id.clone() });
        };
        let mut next = guard.to_vec();
        update.apply(&mut next[pos]);
        let updated = next[pos].clone();
        *guard = next.into();
        Ok(updated)
    }

    /// Removes a contact and returns it.
    pub async fn remove(&self, id: &ContactId) -> Result<EmergencyContact, ContactError> {
        let mut guard = self.contacts.write().await;
        let Some(pos) = guard.iter().position(|c| &c.id == id) else {
            return Err(ContactError::NotFound { id: id.clone() });
        };
        let mut next = guard.to_vec();
        let removed = next.remove(pos);
        *guard = next.into();
        Ok(removed)
    }
}

impl Default for ContactRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family() -> Vec<EmergencyContact> {
        vec![
            EmergencyContact::new("1", "Mom", "+1 (555) 123-4567", "Family"),
            EmergencyContact::new("2", "Dad", "+1 (555) 234-5678", "Family"),
        ]
    }

    #[tokio::test]
    async fn test_add_preserves_order_and_rejects_duplicates() {
        let reg = ContactRegistry::with_contacts(family());
        reg.add(EmergencyContact::new("3", "Sarah", "+1 (555) 345-6789", "Friend"))
            .await
            .unwrap();

        let err = reg
            .add(EmergencyContact::new("1", "Someone", "000", "Other"))
            .await
            .unwrap_err();
        assert_eq!(err, ContactError::Duplicate { id: "1".into() });

        let names: Vec<_> = reg.snapshot().await.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, ["Mom", "Dad", "Sarah"]);
    }

    #[tokio::test]
    async fn test_snapshot_is_isolated_from_later_edits() {
        let reg = ContactRegistry::with_contacts(family());
        let before = reg.snapshot().await;

        reg.remove(&"1".into()).await.unwrap();
        reg.update(&"2".into(), ContactUpdate::default().phone("999"))
            .await
            .unwrap();

        assert_eq!(before.len(), 2);
        assert_eq!(before[1].phone, "+1 (555) 234-5678");
        assert_eq!(reg.len().await, 1);
        assert_eq!(reg.get(&"2".into()).await.unwrap().phone, "999");
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let reg = ContactRegistry::with_contacts(family());
        let updated = reg
            .update(&"1".into(), ContactUpdate::default().relationship("Parent"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Mom");
        assert_eq!(updated.relationship, "Parent");
    }

    #[tokio::test]
    async fn test_missing_ids_are_reported() {
        let reg = ContactRegistry::new();
        assert!(reg.is_empty().await);
        assert_eq!(
            reg.remove(&"x".into()).await.unwrap_err().as_label(),
            "contact_not_found"
        );
        assert!(
            reg.update(&"x".into(), ContactUpdate::default())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_seed_drops_duplicate_ids() {
        let mut seed = family();
        seed.push(EmergencyContact::new("1", "Dup", "0", "x"));
        let reg = ContactRegistry::with_contacts(seed);
        assert_eq!(reg.len().await, 2);
        assert_eq!(reg.get(&"1".into()).await.unwrap().name, "Mom");
    }
}
