//! Validation engine for contact submissions.
//!
//! A submission is checked by an explicit, ordered rule list: name presence
//! and uniqueness first (the only rule that touches the record set), then the
//! pure format rules for email and phone. Errors accumulate instead of
//! short-circuiting, and always come back in that order.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactDraft};
use crate::grammar;

/// Read-only access to the record set, used for the uniqueness rule.
#[async_trait]
pub trait NameLookup: Send + Sync {
    type Error: Send;

    async fn contact_named(&self, name: &str) -> Result<Option<Contact>, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
}

impl Field {
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
        }
    }
}

/// Symbolic reason a submission was rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("missing_name")]
    MissingName,
    #[error("duplicate_name")]
    DuplicateName,
    #[error("invalid_email")]
    InvalidEmail,
    #[error("invalid_phone")]
    InvalidPhone,
}

impl ValidationError {
    pub const fn code(self) -> &'static str {
        match self {
            ValidationError::MissingName => "missing_name",
            ValidationError::DuplicateName => "duplicate_name",
            ValidationError::InvalidEmail => "invalid_email",
            ValidationError::InvalidPhone => "invalid_phone",
        }
    }

    pub const fn field(self) -> Field {
        match self {
            ValidationError::MissingName | ValidationError::DuplicateName => Field::Name,
            ValidationError::InvalidEmail => Field::Email,
            ValidationError::InvalidPhone => Field::Phone,
        }
    }
}

/// The mutation a verdict was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Update => "update",
        })
    }
}

/// Proof that a draft passed validation. Only this module can build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approved {
    draft: ContactDraft,
    operation: Operation,
}

impl Approved {
    pub fn draft(&self) -> &ContactDraft {
        &self.draft
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn into_draft(self) -> ContactDraft {
        self.draft
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(Approved),
    Rejected(Vec<ValidationError>),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }

    /// Errors carried by a rejection; empty when accepted.
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Verdict::Accepted(_) => &[],
            Verdict::Rejected(errors) => errors,
        }
    }
}

struct FormatRule {
    error: ValidationError,
    holds: fn(&ContactDraft) -> bool,
}

fn email_holds(draft: &ContactDraft) -> bool {
    grammar::is_email(&draft.email)
}

fn phone_holds(draft: &ContactDraft) -> bool {
    grammar::is_id_mobile_phone(&draft.phone)
}

const FORMAT_RULES: &[FormatRule] = &[
    FormatRule {
        error: ValidationError::InvalidEmail,
        holds: email_holds,
    },
    FormatRule {
        error: ValidationError::InvalidPhone,
        holds: phone_holds,
    },
];

/// Pure format checks, in declaration order.
pub fn check_format(draft: &ContactDraft) -> Vec<ValidationError> {
    FORMAT_RULES
        .iter()
        .filter(|rule| !(rule.holds)(draft))
        .map(|rule| rule.error)
        .collect()
}

pub async fn validate_for_create<L>(lookup: &L, draft: ContactDraft) -> Result<Verdict, L::Error>
where
    L: NameLookup + ?Sized,
{
    evaluate(lookup, draft, None, Operation::Create).await
}

/// Like [`validate_for_create`], but a record already holding the submitted
/// name is not a collision when that name is `original_name`: it is the
/// record being edited.
pub async fn validate_for_update<L>(
    lookup: &L,
    draft: ContactDraft,
    original_name: &str,
) -> Result<Verdict, L::Error>
where
    L: NameLookup + ?Sized,
{
    evaluate(lookup, draft, Some(original_name), Operation::Update).await
}

async fn evaluate<L>(
    lookup: &L,
    draft: ContactDraft,
    original_name: Option<&str>,
    operation: Operation,
) -> Result<Verdict, L::Error>
where
    L: NameLookup + ?Sized,
{
    let mut errors = Vec::new();

    if draft.name.trim().is_empty() {
        errors.push(ValidationError::MissingName);
    } else if let Some(existing) = lookup.contact_named(&draft.name).await? {
        let is_self = original_name.is_some_and(|original| existing.name == original);
        if !is_self {
            errors.push(ValidationError::DuplicateName);
        }
    }

    errors.extend(check_format(&draft));

    if errors.is_empty() {
        Ok(Verdict::Accepted(Approved { draft, operation }))
    } else {
        Ok(Verdict::Rejected(errors))
    }
}
