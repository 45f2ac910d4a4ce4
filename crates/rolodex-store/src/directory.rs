//! The contact directory: every read and mutation of the record set goes
//! through here, and every mutation requires an accepted verdict.

use std::sync::Arc;

use async_trait::async_trait;
use rolodex_core::{
    validate_for_create, validate_for_update, Contact, ContactDraft, ContactId, Flash,
    NameLookup, Notice, Operation, Settings, StoreBackend, ValidationError, Verdict,
};
use tracing::{error, info};

use crate::memory::MemoryStorage;
use crate::sqlite::SqliteStorage;
use crate::storage::{ContactStorage, Selector, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("submission rejected: {}", join_codes(.0))]
    Rejected(Vec<ValidationError>),
    #[error("contact not found")]
    NotFound,
    #[error("mutation attempted without an accepted {expected} verdict")]
    RejectedInput { expected: Operation },
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for DirectoryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NameTaken(_) => DirectoryError::Rejected(vec![ValidationError::DuplicateName]),
            other => DirectoryError::Storage(other),
        }
    }
}

fn join_codes(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.code())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone)]
pub struct Directory {
    storage: Arc<dyn ContactStorage>,
}

impl Directory {
    pub fn new(storage: Arc<dyn ContactStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Builds the backend named by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, StorageError> {
        match settings.backend {
            StoreBackend::Memory => Ok(Self::in_memory()),
            StoreBackend::Sqlite => {
                let store = SqliteStorage::open(&settings.db_path)?;
                Ok(Self::new(Arc::new(store)))
            }
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Contact>, DirectoryError> {
        Ok(self.storage.find().await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Contact, DirectoryError> {
        self.storage
            .find_one(&Selector::name(name))
            .await?
            .ok_or(DirectoryError::NotFound)
    }

    pub async fn find_by_id(&self, id: ContactId) -> Result<Contact, DirectoryError> {
        self.storage
            .find_one(&Selector::Id(id))
            .await?
            .ok_or(DirectoryError::NotFound)
    }

    pub async fn validate_create(&self, draft: ContactDraft) -> Result<Verdict, DirectoryError> {
        Ok(validate_for_create(self, draft).await?)
    }

    pub async fn validate_update(
        &self,
        draft: ContactDraft,
        original_name: &str,
    ) -> Result<Verdict, DirectoryError> {
        Ok(validate_for_update(self, draft, original_name).await?)
    }

    pub async fn create(&self, verdict: Verdict) -> Result<Contact, DirectoryError> {
        let draft = approved_for(verdict, Operation::Create)?;
        let contact = self.storage.insert(draft).await?;
        info!(id = %contact.id, name = %contact.name, "contact created");
        Ok(contact)
    }

    /// Overwrites the editable fields of `id`; the id itself never changes.
    pub async fn update(&self, id: ContactId, verdict: Verdict) -> Result<Contact, DirectoryError> {
        let draft = approved_for(verdict, Operation::Update)?;
        let contact = self
            .storage
            .update_one(id, draft)
            .await?
            .ok_or(DirectoryError::NotFound)?;
        info!(id = %contact.id, name = %contact.name, "contact updated");
        Ok(contact)
    }

    /// Removes the contact named `name`. Deleting an absent name is not an error.
    pub async fn delete(&self, name: &str) -> Result<Option<Contact>, DirectoryError> {
        let removed = self.storage.delete_one(&Selector::name(name)).await?;
        log_delete(name, removed.as_ref());
        Ok(removed)
    }

    pub async fn delete_by_id(&self, id: ContactId) -> Result<Option<Contact>, DirectoryError> {
        let removed = self.storage.delete_one(&Selector::Id(id)).await?;
        log_delete(&id.to_string(), removed.as_ref());
        Ok(removed)
    }

    pub async fn submit_create(
        &self,
        draft: ContactDraft,
        flash: &Flash,
    ) -> Result<Contact, DirectoryError> {
        let verdict = self.validate_create(draft).await?;
        if let Verdict::Rejected(errors) = verdict {
            return Err(DirectoryError::Rejected(errors));
        }
        let contact = self.create(verdict).await?;
        flash.post(Notice::ContactAdded);
        Ok(contact)
    }

    pub async fn submit_update(
        &self,
        id: ContactId,
        draft: ContactDraft,
        original_name: &str,
        flash: &Flash,
    ) -> Result<Contact, DirectoryError> {
        let verdict = self.validate_update(draft, original_name).await?;
        if let Verdict::Rejected(errors) = verdict {
            return Err(DirectoryError::Rejected(errors));
        }
        let contact = self.update(id, verdict).await?;
        flash.post(Notice::ContactUpdated);
        Ok(contact)
    }

    pub async fn submit_delete(
        &self,
        name: &str,
        flash: &Flash,
    ) -> Result<Option<Contact>, DirectoryError> {
        let removed = self.delete(name).await?;
        flash.post(Notice::ContactDeleted);
        Ok(removed)
    }

    pub async fn submit_delete_by_id(
        &self,
        id: ContactId,
        flash: &Flash,
    ) -> Result<Option<Contact>, DirectoryError> {
        let removed = self.delete_by_id(id).await?;
        flash.post(Notice::ContactDeleted);
        Ok(removed)
    }
}

#[async_trait]
impl NameLookup for Directory {
    type Error = StorageError;

    async fn contact_named(&self, name: &str) -> Result<Option<Contact>, StorageError> {
        self.storage.find_one(&Selector::name(name)).await
    }
}

fn approved_for(verdict: Verdict, expected: Operation) -> Result<ContactDraft, DirectoryError> {
    match verdict {
        Verdict::Accepted(approved) if approved.operation() == expected => {
            Ok(approved.into_draft())
        }
        Verdict::Accepted(approved) => {
            error!(%expected, got = %approved.operation(), "verdict issued for another operation");
            Err(DirectoryError::RejectedInput { expected })
        }
        Verdict::Rejected(errors) => {
            error!(%expected, errors = %join_codes(&errors), "mutation attempted with rejected verdict");
            Err(DirectoryError::RejectedInput { expected })
        }
    }
}

fn log_delete(key: &str, removed: Option<&Contact>) {
    match removed {
        Some(contact) => info!(id = %contact.id, name = %contact.name, "contact deleted"),
        None => info!(key, "delete matched no contact"),
    }
}
