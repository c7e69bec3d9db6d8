//! Category synchronization protocol
//!
//! A weaker, best-effort counterpart to the item protocol for the
//! user-extensible category taxonomy. Identity is the case-insensitive
//! (owner, name) pair; `pending_sync` plays the role `dirty` plays for
//! items. Every sub-step swallows and logs its own failures:
//! [`CategoryService::sync_categories`] never propagates an error, it runs
//! as a background step on every refresh.

use crate::domain::taxonomy::{self, CategoryKey};
use crate::domain::{Category, GLOBAL_OWNER};
use crate::infrastructure::events::{EventBus, SyncEvent};
use crate::infrastructure::stores::{
    IdentityProvider, LocalCategoryStore, RemoteCategoryStore, StoreError,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Whether a category name is (case-insensitively) one of the fixed
/// default keys. Defaults are never pushed and never duplicated into a
/// user's own owned set.
fn is_default_key(name: &str) -> bool {
    CategoryKey::from_key(name.trim().to_lowercase().as_str()).is_some()
}

/// Category sync, creation and the live per-owner category list
pub struct CategoryService {
    local: Arc<dyn LocalCategoryStore>,
    remote: Arc<dyn RemoteCategoryStore>,
    identity: Arc<dyn IdentityProvider>,
    events: Arc<EventBus>,
    live: watch::Sender<Vec<Category>>,
}

impl CategoryService {
    pub fn new(
        local: Arc<dyn LocalCategoryStore>,
        remote: Arc<dyn RemoteCategoryStore>,
        identity: Arc<dyn IdentityProvider>,
        events: Arc<EventBus>,
    ) -> Self {
        let (live, _) = watch::channel(Vec::new());
        Self {
            local,
            remote,
            identity,
            events,
            live,
        }
    }

    /// Live view of the current owner's effective category set (own
    /// categories plus global defaults), sorted by name. Re-published after
    /// every local mutation and whenever the authenticated identity
    /// changes.
    pub fn categories(&self) -> watch::Receiver<Vec<Category>> {
        self.live.subscribe()
    }

    /// Watch the identity stream and re-scope the live list on every
    /// change. Spawned once by the core assembly.
    pub fn spawn_identity_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        let mut identity_rx = service.identity.watch();
        tokio::spawn(async move {
            while identity_rx.changed().await.is_ok() {
                debug!("identity changed, re-scoping category list");
                service.refresh_live().await;
            }
        })
    }

    /// Re-query the local set for the current owner and publish it
    pub async fn refresh_live(&self) {
        let owner_id = self.identity.current_user_id().unwrap_or_default();
        match self.local.get_all_for_owner(&owner_id).await {
            Ok(mut categories) => {
                categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
                // send_replace updates the value even before anyone subscribes
                let _ = self.live.send_replace(categories);
                self.events.emit(SyncEvent::CategoriesChanged);
            }
            Err(e) => warn!(error = %e, "failed to load categories for live list"),
        }
    }

    /// Add a user-typed category.
    ///
    /// Trims the name (empty is a silent no-op) and is idempotent against
    /// the owner's effective set, case-insensitively. Text that resolves to
    /// a canonical key (in any supported locale) is checked under that key,
    /// so localized spellings of a default never create an owned duplicate.
    /// Unauthenticated adds are inserted with `pending_sync = true` and
    /// claimed by the account that logs in later; authenticated adds are
    /// pushed immediately and fall back to pending on failure.
    pub async fn add_category(
        &self,
        name: &str,
        legacy_resource_id: i32,
    ) -> Result<(), StoreError> {
        let name = match taxonomy::resolve_key_from_text(name) {
            Some(key) => key.as_key(),
            None => name.trim(),
        };
        if name.is_empty() {
            return Ok(());
        }

        let owner_id = self.identity.current_user_id().unwrap_or_default();
        if let Some(existing) = self.local.find_by_name_for_owner(&owner_id, name).await? {
            debug!(name = %existing.name, "category already exists, skipping add");
            return Ok(());
        }

        let mut category = Category::new(owner_id.clone(), name);
        category.localization_resource_id = legacy_resource_id;
        category.pending_sync = owner_id == GLOBAL_OWNER;
        self.local.upsert(category.clone()).await?;

        if owner_id != GLOBAL_OWNER {
            if let Err(e) = self.remote.set(&owner_id, &category).await {
                warn!(name = %category.name, error = %e, "failed to push new category, marking pending");
                self.local.upsert(category.with_pending_sync(true)).await?;
            }
        }

        self.refresh_live().await;
        Ok(())
    }

    /// Reconcile local and remote category sets for the current user.
    ///
    /// Without an authenticated user there is nothing to reconcile with,
    /// purely local creation is still allowed. Every sub-step is
    /// independently fault-tolerant; failures are logged and the affected
    /// rows stay pending for the next cycle.
    pub async fn sync_categories(&self) {
        let Some(owner_id) = self.identity.current_user_id() else {
            debug!("no authenticated user, skipping category sync");
            return;
        };

        self.push_pending(&owner_id).await;
        self.reconcile_with_remote(&owner_id).await;
        self.refresh_live().await;
    }

    /// Push pending rows: the user's own retries, and anonymous rows
    /// created before login which get claimed by this account
    async fn push_pending(&self, owner_id: &str) {
        let pending = match self.local.get_all_for_owner(owner_id).await {
            Ok(all) => all
                .into_iter()
                // Defaults are never pushed; anonymous creations share the
                // global owner but are distinguished by the pending flag.
                .filter(|c| c.pending_sync && !is_default_key(&c.name))
                .collect::<Vec<_>>(),
            Err(e) => {
                warn!(error = %e, "failed to load pending categories");
                return;
            }
        };

        for category in pending {
            if category.owner_id == owner_id {
                let clean = category.with_pending_sync(false);
                match self.remote.set(owner_id, &clean).await {
                    Ok(()) => {
                        if let Err(e) = self.local.upsert(clean).await {
                            warn!(name = %category.name, error = %e, "failed to clear pending flag");
                        }
                    }
                    Err(e) => {
                        warn!(name = %category.name, error = %e, "failed to push pending category, will retry");
                    }
                }
            } else if category.owner_id == GLOBAL_OWNER {
                self.claim_anonymous(owner_id, category).await;
            }
        }
    }

    /// Claim a category created while unauthenticated: drop the anonymous
    /// row (its (owner, name) identity would clash otherwise), re-create it
    /// under the current user and push it
    async fn claim_anonymous(&self, owner_id: &str, category: Category) {
        if let Err(e) = self
            .local
            .delete_by_owner_and_name(GLOBAL_OWNER, &category.name)
            .await
        {
            warn!(name = %category.name, error = %e, "failed to remove anonymous category row");
            return;
        }

        let mut claimed = category.owned_by(owner_id).with_pending_sync(false);
        if let Err(e) = self.remote.set(owner_id, &claimed).await {
            warn!(name = %claimed.name, error = %e, "failed to push claimed category, marking pending");
            claimed.pending_sync = true;
        }
        if let Err(e) = self.local.upsert(claimed.clone()).await {
            warn!(name = %claimed.name, error = %e, "failed to re-own anonymous category");
        } else {
            info!(name = %claimed.name, "claimed anonymous category for signed-in user");
        }
    }

    /// Two-way reconciliation against the owner's remote collection:
    /// local-only rows go up, remote rows come down (annotated with their
    /// legacy resource id), and default-named rows owned by the user are
    /// purged, since defaults only ever live under the global owner.
    async fn reconcile_with_remote(&self, owner_id: &str) {
        let local = match self.local.get_all_for_owner(owner_id).await {
            Ok(categories) => categories,
            Err(e) => {
                warn!(error = %e, "failed to load local categories for reconciliation");
                return;
            }
        };
        let remote = match self.remote.query(owner_id).await {
            Ok(categories) => categories,
            Err(e) => {
                warn!(error = %e, "failed to fetch remote categories");
                return;
            }
        };

        // Local-only rows (settled, owned, not defaults) that remote is
        // missing by case-insensitive name.
        for category in local
            .iter()
            .filter(|c| c.owner_id == owner_id && !c.pending_sync && !is_default_key(&c.name))
            .filter(|c| !remote.iter().any(|r| r.name_matches(&c.name)))
        {
            if let Err(e) = self.remote.set(owner_id, category).await {
                warn!(name = %category.name, error = %e, "failed to push local-only category");
            }
        }

        // Purge duplicated default-named rows under the user's own owner.
        for duplicate in local
            .iter()
            .filter(|c| c.owner_id == owner_id && is_default_key(&c.name))
        {
            if let Err(e) = self
                .local
                .delete_by_owner_and_name(owner_id, &duplicate.name)
                .await
            {
                warn!(name = %duplicate.name, error = %e, "failed to purge duplicated default category");
            }
        }

        // Adopt remote rows, re-annotated with the legacy resource id when
        // the name resolves to a known default (covers localized spellings
        // pushed by older clients). Default-keyed rows are not copied into
        // the user's owned set; the global default row covers them.
        let to_upsert: Vec<Category> = remote
            .into_iter()
            .filter(|c| !is_default_key(&c.name))
            .map(|c| {
                let mut category = c.owned_by(owner_id).with_pending_sync(false);
                if let Some(key) = taxonomy::resolve_key_from_text(&category.name) {
                    category.localization_resource_id = key.legacy_resource_id();
                }
                category
            })
            .collect();

        if !to_upsert.is_empty() {
            debug!(count = to_upsert.len(), "adopting remote categories");
            if let Err(e) = self.local.upsert_many(to_upsert).await {
                warn!(error = %e, "failed to upsert remote categories");
            }
        }
    }
}
