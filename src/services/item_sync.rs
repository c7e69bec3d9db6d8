//! Item synchronization protocol
//!
//! Push-then-pull mirroring between the local item table and the remote
//! item collection. The per-row `dirty` flag is both the push queue and the
//! retry mechanism: a failed push leaves it set, and the next refresh tries
//! again. The pull merge never overwrites a dirty row, so an unpushed local
//! edit always wins until it reaches remote.

use crate::domain::Item;
use crate::infrastructure::stores::{
    ConnectivityProbe, IdentityProvider, LocalItemStore, RemoteItemStore, StoreError,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Sync failures surfaced to the caller (and, for pull, to the user)
#[derive(Error, Debug)]
pub enum SyncError {
    /// No network at the pre-flight check
    #[error("no network connection")]
    Offline,

    /// No authenticated user
    #[error("not signed in")]
    NotAuthenticated,

    /// Remote fetch or write failed; carries the underlying message
    #[error("sync failed: {0}")]
    Remote(String),

    /// Local store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The item sync protocol, over injected store capabilities
pub struct ItemSyncService {
    local: Arc<dyn LocalItemStore>,
    remote: Arc<dyn RemoteItemStore>,
    identity: Arc<dyn IdentityProvider>,
    connectivity: Arc<dyn ConnectivityProbe>,
}

impl ItemSyncService {
    pub fn new(
        local: Arc<dyn LocalItemStore>,
        remote: Arc<dyn RemoteItemStore>,
        identity: Arc<dyn IdentityProvider>,
        connectivity: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            local,
            remote,
            identity,
            connectivity,
        }
    }

    /// Push every dirty item to the remote collection.
    ///
    /// Offline is a silent no-op. A failed write leaves that item dirty and
    /// moves on; one item's failure never aborts the batch. Each item's
    /// push plus local flag clear is its own unit, there is no batch
    /// transaction.
    pub async fn push_local_to_remote(&self) -> Result<(), SyncError> {
        if !self.connectivity.is_online().await {
            debug!("offline, skipping push");
            return Ok(());
        }

        let dirty = self.local.get_all_dirty().await?;
        if dirty.is_empty() {
            debug!("no dirty items to push");
            return Ok(());
        }
        info!(count = dirty.len(), "pushing dirty items");

        for item in dirty {
            // Remote documents always carry dirty = false; the flag only
            // means something locally.
            let clean = item.marked_clean();
            match self.remote.set(&clean).await {
                Ok(()) => {
                    if let Err(e) = self.local.update(clean).await {
                        warn!(id = %item.id, error = %e, "pushed item but failed to clear dirty flag");
                    } else {
                        debug!(id = %item.id, "pushed item");
                    }
                }
                Err(e) => {
                    warn!(id = %item.id, error = %e, "failed to push item, will retry next cycle");
                }
            }
        }
        Ok(())
    }

    /// Pull the owner's remote items and merge them into local storage.
    ///
    /// Merge rule: a remote item is inserted when unknown locally and
    /// overwrites the local row only when that row is not dirty. Dirty rows
    /// are skipped for this cycle; they win on the next push instead. The
    /// whole merge is applied as one atomic batch.
    pub async fn pull_remote_to_local(&self) -> Result<(), SyncError> {
        if !self.connectivity.is_online().await {
            return Err(SyncError::Offline);
        }
        let owner_id = self
            .identity
            .current_user_id()
            .ok_or(SyncError::NotAuthenticated)?;

        let remote_items = self
            .remote
            .query(&owner_id)
            .await
            .map_err(|e| SyncError::Remote(e.to_string()))?;
        debug!(count = remote_items.len(), "fetched remote items");

        let local_items = self.local.get_all().await?;
        let local_by_id: HashMap<&str, &Item> =
            local_items.iter().map(|item| (item.id.as_str(), item)).collect();

        let mut batch = Vec::new();
        for remote_item in remote_items {
            match local_by_id.get(remote_item.id.as_str()) {
                None => batch.push(remote_item.marked_clean()),
                Some(local_item) if !local_item.dirty => {
                    batch.push(remote_item.marked_clean());
                }
                Some(_) => {
                    debug!(id = %remote_item.id, "skipping remote item, local edit pending");
                }
            }
        }

        if !batch.is_empty() {
            info!(count = batch.len(), "merging remote items into local store");
            self.local.apply_merge(batch).await?;
        }
        Ok(())
    }

    /// Delete an item from both stores.
    ///
    /// The delete is immediate and not conflict-resolved. The local row
    /// goes first so the UI reflects the delete even if the remote call
    /// fails while offline.
    pub async fn delete_item(&self, id: &str) -> Result<(), SyncError> {
        self.local.delete(id).await?;

        if !self.connectivity.is_online().await {
            debug!(id = %id, "offline, remote delete deferred");
            return Ok(());
        }
        self.remote
            .delete(id)
            .await
            .map_err(|e| SyncError::Remote(e.to_string()))?;
        info!(id = %id, "deleted item locally and remotely");
        Ok(())
    }
}
