use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rolodex_core::{Contact, ContactDraft, ContactId};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::storage::{now_stamp, ContactStorage, Selector, StorageError};

const SELECT_COLUMNS: &str = "SELECT id,name,phone,email,created,updated FROM contacts";

/// SQLite-backed storage. A single connection serialises all access; async
/// callers are moved onto the blocking pool.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        // Pragmas tuned for async server usage
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        // Busy timeout (default 5000ms; override with ROLODEX_SQLITE_BUSY_MS)
        let busy_ms: u64 = std::env::var("ROLODEX_SQLITE_BUSY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);
        conn.busy_timeout(std::time::Duration::from_millis(busy_ms))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS contacts (
              seq INTEGER PRIMARY KEY AUTOINCREMENT,
              id TEXT NOT NULL UNIQUE,
              name TEXT NOT NULL UNIQUE,
              phone TEXT NOT NULL,
              email TEXT NOT NULL,
              created TEXT NOT NULL,
              updated TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn find_one_blocking(&self, selector: &Selector) -> Result<Option<Contact>, StorageError> {
        let conn = self.conn.lock();
        let raw = match selector {
            Selector::Id(id) => conn
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE id=?"),
                    params![id.to_string()],
                    RawContact::from_row,
                )
                .optional()?,
            Selector::Name(name) => conn
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE name=?"),
                    params![name],
                    RawContact::from_row,
                )
                .optional()?,
        };
        raw.map(RawContact::into_contact).transpose()
    }

    pub fn find_blocking(&self) -> Result<Vec<Contact>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY seq ASC"))?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(RawContact::from_row(row)?.into_contact()?);
        }
        Ok(out)
    }

    pub fn insert_blocking(&self, fields: ContactDraft) -> Result<Contact, StorageError> {
        let conn = self.conn.lock();
        let now = now_stamp();
        let contact = Contact {
            id: ContactId::generate(),
            name: fields.name,
            phone: fields.phone,
            email: fields.email,
            created: now.clone(),
            updated: now,
        };
        conn.execute(
            "INSERT INTO contacts(id,name,phone,email,created,updated) VALUES (?,?,?,?,?,?)",
            params![
                contact.id.to_string(),
                contact.name,
                contact.phone,
                contact.email,
                contact.created,
                contact.updated,
            ],
        )
        .map_err(|err| name_taken_or(err, &contact.name))?;
        Ok(contact)
    }

    pub fn update_one_blocking(
        &self,
        id: ContactId,
        fields: ContactDraft,
    ) -> Result<Option<Contact>, StorageError> {
        let conn = self.conn.lock();
        let id_s = id.to_string();
        let n = conn
            .execute(
                "UPDATE contacts SET name=?, phone=?, email=?, updated=? WHERE id=?",
                params![fields.name, fields.phone, fields.email, now_stamp(), id_s],
            )
            .map_err(|err| name_taken_or(err, &fields.name))?;
        if n == 0 {
            return Ok(None);
        }
        let raw = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id=?"),
                params![id_s],
                RawContact::from_row,
            )
            .optional()?;
        raw.map(RawContact::into_contact).transpose()
    }

    pub fn delete_one_blocking(&self, selector: &Selector) -> Result<Option<Contact>, StorageError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let raw = match selector {
            Selector::Id(id) => tx
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE id=?"),
                    params![id.to_string()],
                    RawContact::from_row,
                )
                .optional()?,
            Selector::Name(name) => tx
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE name=?"),
                    params![name],
                    RawContact::from_row,
                )
                .optional()?,
        };
        if let Some(found) = raw.as_ref() {
            tx.execute("DELETE FROM contacts WHERE id=?", params![found.id])?;
        }
        tx.commit()?;
        raw.map(RawContact::into_contact).transpose()
    }
}

#[async_trait]
impl ContactStorage for SqliteStorage {
    async fn find_one(&self, selector: &Selector) -> Result<Option<Contact>, StorageError> {
        let s = self.clone();
        let selector = selector.clone();
        tokio::task::spawn_blocking(move || s.find_one_blocking(&selector)).await?
    }

    async fn find(&self) -> Result<Vec<Contact>, StorageError> {
        let s = self.clone();
        tokio::task::spawn_blocking(move || s.find_blocking()).await?
    }

    async fn insert(&self, fields: ContactDraft) -> Result<Contact, StorageError> {
        let s = self.clone();
        tokio::task::spawn_blocking(move || s.insert_blocking(fields)).await?
    }

    async fn update_one(
        &self,
        id: ContactId,
        fields: ContactDraft,
    ) -> Result<Option<Contact>, StorageError> {
        let s = self.clone();
        tokio::task::spawn_blocking(move || s.update_one_blocking(id, fields)).await?
    }

    async fn delete_one(&self, selector: &Selector) -> Result<Option<Contact>, StorageError> {
        let s = self.clone();
        let selector = selector.clone();
        tokio::task::spawn_blocking(move || s.delete_one_blocking(&selector)).await?
    }
}

struct RawContact {
    id: String,
    name: String,
    phone: String,
    email: String,
    created: String,
    updated: String,
}

impl RawContact {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            phone: row.get(2)?,
            email: row.get(3)?,
            created: row.get(4)?,
            updated: row.get(5)?,
        })
    }

    fn into_contact(self) -> Result<Contact, StorageError> {
        let id = self.id.parse().map_err(|err: rolodex_core::ParseContactIdError| {
            StorageError::Corrupt {
                id: self.id.clone(),
                reason: err.to_string(),
            }
        })?;
        Ok(Contact {
            id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            created: self.created,
            updated: self.updated,
        })
    }
}

fn name_taken_or(err: rusqlite::Error, name: &str) -> StorageError {
    let unique_name = matches!(
        &err,
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                && msg.contains("contacts.name")
    );
    if unique_name {
        StorageError::NameTaken(name.to_string())
    } else {
        StorageError::Sqlite(err)
    }
}
