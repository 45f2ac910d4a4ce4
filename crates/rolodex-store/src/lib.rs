//! Storage backends for Rolodex contacts and the [`Directory`] that gates
//! every mutation behind a validation verdict.

mod directory;
mod memory;
mod sqlite;
mod storage;

pub use directory::{Directory, DirectoryError};
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use storage::{ContactStorage, Selector, StorageError};
