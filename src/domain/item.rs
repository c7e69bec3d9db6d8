//! Inventory item model
//!
//! An Item is one physical thing the user catalogued. The `dirty` flag is
//! the heart of the sync protocol: it means the local copy may differ from,
//! or not yet exist in, the remote collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical inventory record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Globally unique identifier, allocated client-side at creation.
    /// The sole merge key between local and remote.
    pub id: String,

    /// The authenticated user who owns the record
    pub owner_id: String,

    /// Display name
    pub name: String,

    /// Where the item is stored
    pub location: String,

    /// Canonical category key, or a free-text legacy value
    pub category_key: String,

    /// Legacy localization-resource reference, 0 if none.
    /// Opaque to the sync engine; kept for backward compatibility.
    #[serde(default)]
    pub category_label_id: i32,

    pub description: Option<String>,

    /// Reference to an uploaded photo (upload itself is out of scope)
    pub image_ref: Option<String>,

    /// Always >= 1
    pub quantity: u32,

    pub purchase_date: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub warranty_expiration: Option<DateTime<Utc>>,
    pub serial_number: Option<String>,
    pub model_number: Option<String>,

    /// Set once at creation, never updated
    pub created_at: DateTime<Utc>,

    /// Lending status
    #[serde(flatten)]
    pub lending: LendingState,

    /// Local copy not yet confirmed written to remote.
    /// Remote documents always carry `false`; the flag only means something
    /// in local storage.
    #[serde(default)]
    pub dirty: bool,
}

/// Whether an item is currently lent out, and to whom.
///
/// Invariant: `lent_to` and `return_date` are set iff `is_lent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LendingState {
    #[serde(default)]
    pub is_lent: bool,
    pub lent_to: Option<String>,
    pub return_date: Option<DateTime<Utc>>,
}

impl LendingState {
    /// Mark the item lent to `borrower`, due back at `return_date`
    pub fn lent(borrower: impl Into<String>, return_date: DateTime<Utc>) -> Self {
        Self {
            is_lent: true,
            lent_to: Some(borrower.into()),
            return_date: Some(return_date),
        }
    }

    /// Not lent out
    pub fn returned() -> Self {
        Self::default()
    }
}

impl Item {
    /// Create a new local item. It starts dirty so the next push uploads it.
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
        category_key: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: name.into(),
            location: location.into(),
            category_key: category_key.into(),
            category_label_id: 0,
            description: None,
            image_ref: None,
            quantity: 1,
            purchase_date: None,
            price: None,
            warranty_expiration: None,
            serial_number: None,
            model_number: None,
            created_at: Utc::now(),
            lending: LendingState::default(),
            dirty: true,
        }
    }

    /// Copy of this item with the dirty flag set
    pub fn marked_dirty(&self) -> Self {
        let mut item = self.clone();
        item.dirty = true;
        item
    }

    /// Copy of this item with the dirty flag cleared, as pushed to remote
    pub fn marked_clean(&self) -> Self {
        let mut item = self.clone();
        item.dirty = false;
        item
    }
}
