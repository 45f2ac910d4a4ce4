//! Core domain for Rolodex: the contact record, the validation rules that gate
//! every create/update, the one-shot flash channel and configuration loading.
//!
//! Nothing in this crate owns storage. Uniqueness checks reach the record set
//! through the [`NameLookup`] seam, which the store crate implements.

pub mod config;
mod contact;
mod flash;
mod grammar;
mod validation;

pub use config::{config_schema_json, load_config, Config, Settings, SettingsError, StoreBackend};
pub use contact::{Contact, ContactDraft, ContactId, ParseContactIdError};
pub use flash::{Flash, Notice};
pub use grammar::{is_email, is_id_mobile_phone};
pub use validation::{
    check_format, validate_for_create, validate_for_update, Approved, Field, NameLookup,
    Operation, ValidationError, Verdict,
};
