use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DiffError, Result};

/// Opaque identifier of a saved diff
///
/// Used as the storage key and, since it appears in the page URL, as the
/// only handle a client needs to reopen a diff.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffId(String);

impl DiffId {
    /// Shortest identifier the page route will accept
    pub const MIN_LEN: usize = 6;

    /// Validate an identifier taken from a URL or a store row
    ///
    /// # Errors
    ///
    /// Returns `InvalidDiffId` if the identifier has fewer than `MIN_LEN` characters.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.chars().count() < Self::MIN_LEN {
            return Err(DiffError::InvalidDiffId {
                reason: format!("must be at least {} characters", Self::MIN_LEN),
                model_id: raw,
            });
        }
        Ok(Self(raw))
    }

    /// Wrap generator output, which is long enough by construction
    pub(crate) fn from_encoded(encoded: String) -> Self {
        debug_assert!(encoded.len() >= Self::MIN_LEN);
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DiffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DiffId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A saved comparison state
///
/// Immutable once built: fields are private and there are no setters. The
/// JSON value is whatever the client sent; nothing here looks inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDiff {
    id: DiffId,
    state_json_obj: serde_json::Value,
    created: DateTime<Utc>,
}

impl SavedDiff {
    /// Create a new diff stamped with the current time
    pub fn new(id: DiffId, state_json_obj: serde_json::Value) -> Self {
        Self::with_created(id, state_json_obj, Utc::now())
    }

    /// Rebuild a diff with a known creation time (used when loading from storage)
    pub fn with_created(
        id: DiffId,
        state_json_obj: serde_json::Value,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            state_json_obj,
            created,
        }
    }

    pub fn id(&self) -> &DiffId {
        &self.id
    }

    /// The client-supplied JSON, verbatim
    pub fn state(&self) -> &serde_json::Value {
        &self.state_json_obj
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }
}
