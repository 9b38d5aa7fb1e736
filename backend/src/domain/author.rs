//! Author data model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors returned by [`AuthorInput::validate`] and
/// [`AuthorId::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorValidationError {
    /// The name is the empty string.
    #[error("author name must not be empty")]
    EmptyName,
    /// The email is the empty string.
    #[error("author email must not be empty")]
    EmptyEmail,
    /// The id string is not a UUID.
    #[error("author id must be a valid UUID")]
    InvalidId,
}

/// Stable author identifier.
///
/// Identifiers are minted by the author service before the row exists and
/// are never reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(Uuid);

impl AuthorId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The nil identifier, which never names a persisted author.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Whether this is the nil identifier.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for AuthorId {
    type Err = AuthorValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| AuthorValidationError::InvalidId)
    }
}

/// Persisted author record.
///
/// `Default` yields the zero-value author attached to search hits whose
/// author row no longer resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Minted before the row exists; never reused.
    pub id: AuthorId,
    /// Display name. Not unique.
    pub name: String,
    /// Contact and login email.
    pub email: String,
    /// Stored credential hash. Never serialised and never sent to the
    /// search index.
    #[serde(skip)]
    pub credential_hash: Option<String>,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed by every update.
    pub updated_at: DateTime<Utc>,
}

impl Author {
    /// Build a new author record from validated input.
    pub fn create(input: AuthorInput, id: AuthorId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            credential_hash: input.credential_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Caller-supplied author fields. Never carries an id or timestamps.
///
/// `credential_hash` is produced by an external credential collaborator;
/// this crate stores it verbatim and never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInput {
    /// Display name; must not be the empty string on creation.
    pub name: String,
    /// Email; must not be the empty string on creation.
    pub email: String,
    /// Precomputed hash, stored verbatim.
    #[serde(default, skip_serializing)]
    pub credential_hash: Option<String>,
}

impl AuthorInput {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            credential_hash: None,
        }
    }

    /// Attach a precomputed credential hash.
    pub fn with_credential_hash(mut self, hash: impl Into<String>) -> Self {
        self.credential_hash = Some(hash.into());
        self
    }

    /// Check the required fields are present. Only the empty string is
    /// rejected; whitespace is stored as given.
    pub fn validate(&self) -> Result<(), AuthorValidationError> {
        if self.name.is_empty() {
            return Err(AuthorValidationError::EmptyName);
        }
        if self.email.is_empty() {
            return Err(AuthorValidationError::EmptyEmail);
        }
        Ok(())
    }

    /// Project the input onto an update of an existing row.
    pub fn into_update(self, id: AuthorId, updated_at: DateTime<Utc>) -> AuthorUpdate {
        AuthorUpdate {
            id,
            name: self.name,
            email: self.email,
            updated_at,
        }
    }
}

/// Column changes applied by an author update. `created_at` is never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorUpdate {
    pub id: AuthorId,
    pub name: String,
    pub email: String,
    pub updated_at: DateTime<Utc>,
}

/// Identifier and display name pair returned by name lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorIdName {
    /// Author id.
    pub id: AuthorId,
    /// Display name as stored.
    pub name: String,
}
