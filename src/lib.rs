//! Trove Core
//!
//! Offline-first sync engine for a personal-inventory catalogue: a local
//! item/category store mirrored to a remote per-user document collection,
//! reconciled opportunistically with per-record dirty flags and
//! last-writer-wins merge. Storage, identity and connectivity are injected
//! capabilities; the UI consumes the services and event bus exposed here.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;

use crate::config::AppConfig;
use crate::infrastructure::events::EventBus;
use crate::infrastructure::stores::{
    ConnectivityProbe, IdentityProvider, LocalCategoryStore, LocalItemStore, RemoteCategoryStore,
    RemoteItemStore, StoreError,
};
use crate::services::{bootstrap, CategoryService, ItemSyncService, SyncOrchestrator};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;

/// Core initialization failures
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("config error: {0}")]
    Config(#[from] anyhow::Error),
}

/// The capability surfaces the engine runs against, assembled by whoever
/// owns the application lifecycle (no ambient globals)
pub struct Stores {
    pub items: Arc<dyn LocalItemStore>,
    pub categories: Arc<dyn LocalCategoryStore>,
    pub remote_items: Arc<dyn RemoteItemStore>,
    pub remote_categories: Arc<dyn RemoteCategoryStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub connectivity: Arc<dyn ConnectivityProbe>,
}

/// The main context for the sync engine
pub struct Core {
    /// Application configuration
    config: Arc<RwLock<AppConfig>>,

    /// Event bus for sync lifecycle events
    pub events: Arc<EventBus>,

    /// Category sync and the live category list
    pub categories: Arc<CategoryService>,

    /// Item sync protocol
    pub items: Arc<ItemSyncService>,

    /// Refresh sequencing
    pub orchestrator: Arc<SyncOrchestrator>,

    identity_watcher: JoinHandle<()>,
    periodic_refresh: Option<JoinHandle<()>>,
}

impl Core {
    /// Initialize the engine: one explicit, awaited startup sequence, so
    /// default categories exist before any sync or normalization reads
    /// them.
    pub async fn new(config: AppConfig, stores: Stores) -> Result<Self, CoreError> {
        info!("Initializing Trove core at {:?}", config.data_dir);

        // 1. Seed default categories on first run
        bootstrap::seed_default_categories(stores.categories.as_ref()).await?;

        // 2. One-time normalization of legacy item categories
        let mut config = config;
        if !config.categories_normalized {
            let changed = bootstrap::normalize_item_categories(stores.items.as_ref()).await?;
            info!(changed, "legacy category normalization completed");
            config.categories_normalized = true;
            config.save()?;
        }

        // 3. Event bus and services
        let events = Arc::new(EventBus::default());
        let categories = Arc::new(CategoryService::new(
            Arc::clone(&stores.categories),
            Arc::clone(&stores.remote_categories),
            Arc::clone(&stores.identity),
            Arc::clone(&events),
        ));
        let items = Arc::new(ItemSyncService::new(
            Arc::clone(&stores.items),
            Arc::clone(&stores.remote_items),
            Arc::clone(&stores.identity),
            Arc::clone(&stores.connectivity),
        ));
        let orchestrator = Arc::new(SyncOrchestrator::new(
            Arc::clone(&categories),
            Arc::clone(&items),
            Arc::clone(&events),
        ));

        // 4. Publish the initial category list and follow identity changes
        categories.refresh_live().await;
        let identity_watcher = categories.spawn_identity_watcher();

        info!("Trove core initialized");

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            events,
            categories,
            items,
            orchestrator,
            identity_watcher,
            periodic_refresh: None,
        })
    }

    /// Get the application configuration
    pub fn config(&self) -> Arc<RwLock<AppConfig>> {
        Arc::clone(&self.config)
    }

    /// Start the periodic background refresh at the configured interval
    pub async fn start_periodic_refresh(&mut self) {
        let interval = self.config.read().await.sync_interval_secs;
        let handle = self
            .orchestrator
            .spawn_periodic(Duration::from_secs(interval));
        self.periodic_refresh = Some(handle);
    }

    /// Stop background tasks
    pub fn shutdown(&mut self) {
        info!("Shutting down Trove core");
        self.identity_watcher.abort();
        if let Some(handle) = self.periodic_refresh.take() {
            handle.abort();
        }
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Install a tracing subscriber honoring `RUST_LOG`, defaulting to `info`
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
