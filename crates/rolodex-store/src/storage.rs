use async_trait::async_trait;
use rolodex_core::{Contact, ContactDraft, ContactId};

/// Addresses a single stored contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(ContactId),
    Name(String),
}

impl Selector {
    pub fn name(name: impl Into<String>) -> Self {
        Selector::Name(name.into())
    }

    pub(crate) fn matches(&self, contact: &Contact) -> bool {
        match self {
            Selector::Id(id) => contact.id == *id,
            Selector::Name(name) => contact.name == *name,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The write would give two live contacts the same name.
    #[error("contact name '{0}' is already taken")]
    NameTaken(String),
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("stored contact {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Persistence seam for contact records.
///
/// Implementations own id assignment and must enforce name uniqueness
/// atomically: `insert` and `update_one` fail with
/// [`StorageError::NameTaken`] rather than produce a second live contact
/// with the same name.
#[async_trait]
pub trait ContactStorage: Send + Sync {
    async fn find_one(&self, selector: &Selector) -> Result<Option<Contact>, StorageError>;

    /// All live contacts in insertion order.
    async fn find(&self) -> Result<Vec<Contact>, StorageError>;

    async fn insert(&self, fields: ContactDraft) -> Result<Contact, StorageError>;

    /// Overwrites name, phone and email of the contact with `id`.
    /// Returns `None` when no such contact exists.
    async fn update_one(
        &self,
        id: ContactId,
        fields: ContactDraft,
    ) -> Result<Option<Contact>, StorageError>;

    /// Removes the first contact matching `selector`, returning it.
    async fn delete_one(&self, selector: &Selector) -> Result<Option<Contact>, StorageError>;
}

pub(crate) fn now_stamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
