//! Capability surfaces the sync engine consumes
//!
//! The engine never talks to a concrete database or document store. It is
//! handed these traits at construction (no ambient globals, no singleton
//! handles) so the whole sync path is testable against in-memory adapters.

use crate::domain::{Category, Item};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

/// Local store failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// No row with the given key
    #[error("not found: {0}")]
    NotFound(String),

    /// Underlying storage failure
    #[error("local store error: {0}")]
    Backend(String),
}

/// Remote document store failures
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Service unreachable or call rejected
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// Any other remote-side failure
    #[error("remote store error: {0}")]
    Backend(String),
}

/// Durable local item table keyed by id: point lookups, full scans and
/// flag-filtered queries. Query execution itself is out of scope; this is
/// the contract the engine relies on.
#[async_trait]
pub trait LocalItemStore: Send + Sync {
    async fn insert(&self, item: Item) -> Result<(), StoreError>;

    async fn update(&self, item: Item) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn get_all(&self) -> Result<Vec<Item>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Item>, StoreError>;

    /// All items with `dirty = true`
    async fn get_all_dirty(&self) -> Result<Vec<Item>, StoreError>;

    async fn delete_all_for_owner(&self, owner_id: &str) -> Result<(), StoreError>;

    /// Upsert the batch atomically. The pull merge goes through this so a
    /// mid-pass crash cannot leave the local set partially merged, and
    /// readers never observe a torn merge.
    async fn apply_merge(&self, items: Vec<Item>) -> Result<(), StoreError>;
}

/// Durable local category table with composite (owner, name) identity,
/// compared case-insensitively
#[async_trait]
pub trait LocalCategoryStore: Send + Sync {
    /// Insert or replace by (owner, name)
    async fn upsert(&self, category: Category) -> Result<(), StoreError>;

    async fn upsert_many(&self, categories: Vec<Category>) -> Result<(), StoreError>;

    /// Categories owned by `owner_id`, plus the global defaults
    async fn get_all_for_owner(&self, owner_id: &str) -> Result<Vec<Category>, StoreError>;

    /// Case-insensitive lookup against the owner's effective set (own
    /// categories plus defaults)
    async fn find_by_name_for_owner(
        &self,
        owner_id: &str,
        name: &str,
    ) -> Result<Option<Category>, StoreError>;

    /// Case-insensitive delete of an owned row
    async fn delete_by_owner_and_name(&self, owner_id: &str, name: &str)
        -> Result<(), StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// Remote item collection, keyed by item id
#[async_trait]
pub trait RemoteItemStore: Send + Sync {
    /// Write (create or replace) the document for `item.id`
    async fn set(&self, item: &Item) -> Result<(), RemoteError>;

    async fn delete(&self, id: &str) -> Result<(), RemoteError>;

    /// All items whose `owner_id` field matches
    async fn query(&self, owner_id: &str) -> Result<Vec<Item>, RemoteError>;
}

/// Remote per-owner category collection, keyed by category name
#[async_trait]
pub trait RemoteCategoryStore: Send + Sync {
    async fn set(&self, owner_id: &str, category: &Category) -> Result<(), RemoteError>;

    async fn query(&self, owner_id: &str) -> Result<Vec<Category>, RemoteError>;
}

/// Current authenticated identity, if any, plus a change stream
pub trait IdentityProvider: Send + Sync {
    /// The authenticated user id, or `None` when signed out
    fn current_user_id(&self) -> Option<String>;

    /// Receiver that yields whenever the authenticated identity changes
    fn watch(&self) -> watch::Receiver<Option<String>>;
}

/// Pre-flight connectivity gate. A passing probe is not a guarantee; calls
/// can still fail afterwards.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}
