//! Category model
//!
//! A category is either a global default (owner = "") visible to every
//! user, or a user-created entry owned by a specific account. Identity is
//! the (owner, name) pair, compared case-insensitively.

use serde::{Deserialize, Serialize};

/// Owner id used for the global default categories
pub const GLOBAL_OWNER: &str = "";

/// A taxonomy entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Empty string denotes an app-wide default category
    #[serde(default)]
    pub owner_id: String,

    /// Free-text or canonical key, unique per owner (case-insensitive)
    pub name: String,

    /// Legacy localization-resource id mapping a default category to a
    /// localized display string; 0 if none
    #[serde(default)]
    pub localization_resource_id: i32,

    /// Created while unauthenticated, or a push attempt failed; retried by
    /// the next category sync
    #[serde(default)]
    pub pending_sync: bool,
}

impl Category {
    /// A user-created category
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            localization_resource_id: 0,
            pending_sync: false,
        }
    }

    /// A global default category entry
    pub fn default_entry(name: impl Into<String>, localization_resource_id: i32) -> Self {
        Self {
            owner_id: GLOBAL_OWNER.to_string(),
            name: name.into(),
            localization_resource_id,
            pending_sync: false,
        }
    }

    /// Whether this row is a global default
    pub fn is_default(&self) -> bool {
        self.owner_id == GLOBAL_OWNER
    }

    /// Case-insensitive name match
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other.trim())
    }

    /// Composite identity key: (owner, lowercased name)
    pub fn identity(&self) -> (String, String) {
        (self.owner_id.clone(), self.name.to_lowercase())
    }

    /// Copy re-owned by `owner_id`
    pub fn owned_by(&self, owner_id: impl Into<String>) -> Self {
        let mut category = self.clone();
        category.owner_id = owner_id.into();
        category
    }

    pub fn with_pending_sync(&self, pending_sync: bool) -> Self {
        let mut category = self.clone();
        category.pending_sync = pending_sync;
        category
    }
}
