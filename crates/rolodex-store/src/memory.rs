use async_trait::async_trait;
use rolodex_core::{Contact, ContactDraft, ContactId};
use tokio::sync::RwLock;

use crate::storage::{now_stamp, ContactStorage, Selector, StorageError};

/// Process-local storage. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    contacts: RwLock<Vec<Contact>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStorage for MemoryStorage {
    async fn find_one(&self, selector: &Selector) -> Result<Option<Contact>, StorageError> {
        let contacts = self.contacts.read().await;
        Ok(contacts.iter().find(|c| selector.matches(c)).cloned())
    }

    async fn find(&self) -> Result<Vec<Contact>, StorageError> {
        Ok(self.contacts.read().await.clone())
    }

    async fn insert(&self, fields: ContactDraft) -> Result<Contact, StorageError> {
        let mut contacts = self.contacts.write().await;
        if contacts.iter().any(|c| c.name == fields.name) {
            return Err(StorageError::NameTaken(fields.name));
        }
        let now = now_stamp();
        let contact = Contact {
            id: ContactId::generate(),
            name: fields.name,
            phone: fields.phone,
            email: fields.email,
            created: now.clone(),
            updated: now,
        };
        contacts.push(contact.clone());
        Ok(contact)
    }

    async fn update_one(
        &self,
        id: ContactId,
        fields: ContactDraft,
    ) -> Result<Option<Contact>, StorageError> {
        let mut contacts = self.contacts.write().await;
        let Some(idx) = contacts.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        if contacts
            .iter()
            .any(|c| c.id != id && c.name == fields.name)
        {
            return Err(StorageError::NameTaken(fields.name));
        }
        let slot = &mut contacts[idx];
        slot.name = fields.name;
        slot.phone = fields.phone;
        slot.email = fields.email;
        slot.updated = now_stamp();
        Ok(Some(slot.clone()))
    }

    async fn delete_one(&self, selector: &Selector) -> Result<Option<Contact>, StorageError> {
        let mut contacts = self.contacts.write().await;
        let removed = contacts
            .iter()
            .position(|c| selector.matches(c))
            .map(|idx| contacts.remove(idx));
        Ok(removed)
    }
}
