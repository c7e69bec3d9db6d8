//! Shared test harness: the sync engine wired to in-memory adapters
#![allow(dead_code)]

use std::sync::Arc;
use trove_core::infrastructure::events::EventBus;
use trove_core::infrastructure::memory::{
    MemoryCategoryStore, MemoryConnectivity, MemoryIdentity, MemoryItemStore,
    MemoryRemoteCategories, MemoryRemoteItems,
};
use trove_core::services::{CategoryService, ItemSyncService, SyncOrchestrator};

pub struct Harness {
    pub local_items: Arc<MemoryItemStore>,
    pub local_categories: Arc<MemoryCategoryStore>,
    pub remote_items: Arc<MemoryRemoteItems>,
    pub remote_categories: Arc<MemoryRemoteCategories>,
    pub identity: Arc<MemoryIdentity>,
    pub connectivity: Arc<MemoryConnectivity>,
    pub events: Arc<EventBus>,
    pub items: Arc<ItemSyncService>,
    pub categories: Arc<CategoryService>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

impl Harness {
    pub fn new(identity: MemoryIdentity, connectivity: MemoryConnectivity) -> Self {
        let local_items = Arc::new(MemoryItemStore::new());
        let local_categories = Arc::new(MemoryCategoryStore::new());
        let remote_items = Arc::new(MemoryRemoteItems::new());
        let remote_categories = Arc::new(MemoryRemoteCategories::new());
        let identity = Arc::new(identity);
        let connectivity = Arc::new(connectivity);
        let events = Arc::new(EventBus::default());

        let items = Arc::new(ItemSyncService::new(
            local_items.clone(),
            remote_items.clone(),
            identity.clone(),
            connectivity.clone(),
        ));
        let categories = Arc::new(CategoryService::new(
            local_categories.clone(),
            remote_categories.clone(),
            identity.clone(),
            events.clone(),
        ));
        let orchestrator = Arc::new(SyncOrchestrator::new(
            categories.clone(),
            items.clone(),
            events.clone(),
        ));

        Self {
            local_items,
            local_categories,
            remote_items,
            remote_categories,
            identity,
            connectivity,
            events,
            items,
            categories,
            orchestrator,
        }
    }

    /// Online and authenticated as `user_id`
    pub fn signed_in(user_id: &str) -> Self {
        Self::new(MemoryIdentity::signed_in(user_id), MemoryConnectivity::online())
    }

    /// Online, no authenticated user
    pub fn signed_out() -> Self {
        Self::new(MemoryIdentity::signed_out(), MemoryConnectivity::online())
    }

    /// Authenticated but offline
    pub fn offline(user_id: &str) -> Self {
        Self::new(
            MemoryIdentity::signed_in(user_id),
            MemoryConnectivity::offline(),
        )
    }
}
