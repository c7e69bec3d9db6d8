//! In-memory reference adapters
//!
//! Back the capability traits with plain hash maps. These are what the
//! integration tests run against, and they double as the reference
//! semantics for real adapters (a SQLite-backed local store, a cloud
//! document collection). The remote adapters support per-key fault
//! injection and call counting so partial-failure and offline behavior can
//! be asserted.

use crate::domain::{Category, Item, GLOBAL_OWNER};
use crate::infrastructure::stores::{
    ConnectivityProbe, IdentityProvider, LocalCategoryStore, LocalItemStore, RemoteCategoryStore,
    RemoteError, RemoteItemStore, StoreError,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{watch, RwLock};

/// In-memory local item table
#[derive(Default)]
pub struct MemoryItemStore {
    items: RwLock<HashMap<String, Item>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalItemStore for MemoryItemStore {
    async fn insert(&self, item: Item) -> Result<(), StoreError> {
        self.items.write().await.insert(item.id.clone(), item);
        Ok(())
    }

    async fn update(&self, item: Item) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        if !items.contains_key(&item.id) {
            return Err(StoreError::NotFound(item.id));
        }
        items.insert(item.id.clone(), item);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.items.write().await.remove(id);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Item>, StoreError> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn get_all_dirty(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|item| item.dirty)
            .cloned()
            .collect())
    }

    async fn delete_all_for_owner(&self, owner_id: &str) -> Result<(), StoreError> {
        self.items
            .write()
            .await
            .retain(|_, item| item.owner_id != owner_id);
        Ok(())
    }

    async fn apply_merge(&self, batch: Vec<Item>) -> Result<(), StoreError> {
        // Single write lock for the whole batch; readers see all or nothing.
        let mut items = self.items.write().await;
        for item in batch {
            items.insert(item.id.clone(), item);
        }
        Ok(())
    }
}

fn category_key(owner_id: &str, name: &str) -> (String, String) {
    (owner_id.to_string(), name.trim().to_lowercase())
}

/// In-memory local category table with (owner, name) composite identity
#[derive(Default)]
pub struct MemoryCategoryStore {
    categories: RwLock<HashMap<(String, String), Category>>,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalCategoryStore for MemoryCategoryStore {
    async fn upsert(&self, category: Category) -> Result<(), StoreError> {
        let key = category_key(&category.owner_id, &category.name);
        self.categories.write().await.insert(key, category);
        Ok(())
    }

    async fn upsert_many(&self, batch: Vec<Category>) -> Result<(), StoreError> {
        let mut categories = self.categories.write().await;
        for category in batch {
            let key = category_key(&category.owner_id, &category.name);
            categories.insert(key, category);
        }
        Ok(())
    }

    async fn get_all_for_owner(&self, owner_id: &str) -> Result<Vec<Category>, StoreError> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .filter(|c| c.owner_id == owner_id || c.owner_id == GLOBAL_OWNER)
            .cloned()
            .collect())
    }

    async fn find_by_name_for_owner(
        &self,
        owner_id: &str,
        name: &str,
    ) -> Result<Option<Category>, StoreError> {
        let needle = name.trim().to_lowercase();
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|c| {
                (c.owner_id == owner_id || c.owner_id == GLOBAL_OWNER)
                    && c.name.to_lowercase() == needle
            })
            .cloned())
    }

    async fn delete_by_owner_and_name(
        &self,
        owner_id: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        let key = category_key(owner_id, name);
        self.categories.write().await.remove(&key);
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.categories.read().await.len())
    }
}

/// In-memory remote item collection with fault injection
#[derive(Default)]
pub struct MemoryRemoteItems {
    documents: RwLock<HashMap<String, Item>>,
    failing_ids: RwLock<HashSet<String>>,
    fail_queries: AtomicBool,
    set_calls: AtomicUsize,
    query_calls: AtomicUsize,
}

impl MemoryRemoteItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `set` for this id fail until cleared
    pub async fn fail_writes_for(&self, id: &str) {
        self.failing_ids.write().await.insert(id.to_string());
    }

    pub async fn clear_failures(&self) {
        self.failing_ids.write().await.clear();
        self.fail_queries.store(false, Ordering::SeqCst);
    }

    /// Make every `query` fail until cleared
    pub fn fail_queries(&self) {
        self.fail_queries.store(true, Ordering::SeqCst);
    }

    /// Seed a document directly, bypassing the sync path
    pub async fn seed(&self, item: Item) {
        self.documents.write().await.insert(item.id.clone(), item);
    }

    pub async fn document(&self, id: &str) -> Option<Item> {
        self.documents.read().await.get(id).cloned()
    }

    pub fn set_call_count(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn query_call_count(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteItemStore for MemoryRemoteItems {
    async fn set(&self, item: &Item) -> Result<(), RemoteError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_ids.read().await.contains(&item.id) {
            return Err(RemoteError::Backend(format!(
                "injected write failure for {}",
                item.id
            )));
        }
        self.documents
            .write()
            .await
            .insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        self.documents.write().await.remove(id);
        Ok(())
    }

    async fn query(&self, owner_id: &str) -> Result<Vec<Item>, RemoteError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("injected query failure".into()));
        }
        Ok(self
            .documents
            .read()
            .await
            .values()
            .filter(|item| item.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

/// In-memory remote category collection (per-owner, keyed by name)
#[derive(Default)]
pub struct MemoryRemoteCategories {
    documents: RwLock<HashMap<(String, String), Category>>,
    failing_names: RwLock<HashSet<String>>,
}

impl MemoryRemoteCategories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `set` for this category name fail until cleared
    pub async fn fail_writes_for(&self, name: &str) {
        self.failing_names
            .write()
            .await
            .insert(name.trim().to_lowercase());
    }

    pub async fn clear_failures(&self) {
        self.failing_names.write().await.clear();
    }

    pub async fn seed(&self, owner_id: &str, category: Category) {
        let key = category_key(owner_id, &category.name);
        self.documents.write().await.insert(key, category);
    }

    pub async fn document(&self, owner_id: &str, name: &str) -> Option<Category> {
        let key = category_key(owner_id, name);
        self.documents.read().await.get(&key).cloned()
    }
}

#[async_trait]
impl RemoteCategoryStore for MemoryRemoteCategories {
    async fn set(&self, owner_id: &str, category: &Category) -> Result<(), RemoteError> {
        if self
            .failing_names
            .read()
            .await
            .contains(&category.name.trim().to_lowercase())
        {
            return Err(RemoteError::Backend(format!(
                "injected write failure for {}",
                category.name
            )));
        }
        let key = category_key(owner_id, &category.name);
        self.documents
            .write()
            .await
            .insert(key, category.clone());
        Ok(())
    }

    async fn query(&self, owner_id: &str) -> Result<Vec<Category>, RemoteError> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|((owner, _), _)| owner == owner_id)
            .map(|(_, category)| category.clone())
            .collect())
    }
}

/// Identity provider backed by a watch channel; tests and app shells flip
/// it via `sign_in` / `sign_out`
pub struct MemoryIdentity {
    sender: watch::Sender<Option<String>>,
}

impl MemoryIdentity {
    pub fn signed_out() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        let (sender, _) = watch::channel(Some(user_id.into()));
        Self { sender }
    }

    pub fn sign_in(&self, user_id: impl Into<String>) {
        // send_replace updates the value even when no receiver is alive
        let _ = self.sender.send_replace(Some(user_id.into()));
    }

    pub fn sign_out(&self) {
        let _ = self.sender.send_replace(None);
    }
}

impl IdentityProvider for MemoryIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.sender.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<String>> {
        self.sender.subscribe()
    }
}

/// Connectivity probe backed by a flag
pub struct MemoryConnectivity {
    online: AtomicBool,
}

impl MemoryConnectivity {
    pub fn online() -> Self {
        Self {
            online: AtomicBool::new(true),
        }
    }

    pub fn offline() -> Self {
        Self {
            online: AtomicBool::new(false),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectivityProbe for MemoryConnectivity {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
