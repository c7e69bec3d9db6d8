//! Refresh orchestration
//!
//! One refresh cycle runs category sync, then item push, then item pull,
//! in that order. Category keys must be resolvable before items referencing
//! them are merged, and local edits get their best chance to leave before
//! remote state is pulled back. Only the pull result is surfaced to the
//! user; everything else retries silently via the persisted flags.

use crate::infrastructure::events::{EventBus, SyncEvent};
use crate::services::category_sync::CategoryService;
use crate::services::item_sync::ItemSyncService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Sequences the sync protocols and owns the refreshing indicator
pub struct SyncOrchestrator {
    categories: Arc<CategoryService>,
    items: Arc<ItemSyncService>,
    events: Arc<EventBus>,
    refreshing: watch::Sender<bool>,
    /// Serializes refresh cycles; overlapping triggers queue rather than
    /// interleave against the same owner's data
    in_flight: Mutex<()>,
}

/// Clears the refreshing indicator on every exit path, panics included
struct RefreshGuard<'a> {
    refreshing: &'a watch::Sender<bool>,
    events: &'a EventBus,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        let _ = self.refreshing.send(false);
        self.events.emit(SyncEvent::RefreshFinished);
    }
}

impl SyncOrchestrator {
    pub fn new(
        categories: Arc<CategoryService>,
        items: Arc<ItemSyncService>,
        events: Arc<EventBus>,
    ) -> Self {
        let (refreshing, _) = watch::channel(false);
        Self {
            categories,
            items,
            events,
            refreshing,
            in_flight: Mutex::new(()),
        }
    }

    /// Whether a refresh cycle is currently running (consumed by the UI)
    pub fn is_refreshing(&self) -> watch::Receiver<bool> {
        self.refreshing.subscribe()
    }

    /// Run one full refresh cycle.
    ///
    /// `manual` marks a user-triggered refresh: success is announced only
    /// then, while pull errors are always announced.
    pub async fn refresh(&self, manual: bool) {
        let _flight = self.in_flight.lock().await;
        let _ = self.refreshing.send(true);
        self.events.emit(SyncEvent::RefreshStarted { manual });
        let _guard = RefreshGuard {
            refreshing: &self.refreshing,
            events: &self.events,
        };

        debug!(manual, "refresh cycle started");

        self.categories.sync_categories().await;

        if let Err(e) = self.items.push_local_to_remote().await {
            // Push failures are retried via the dirty flags; not user-facing.
            warn!(error = %e, "item push failed during refresh");
        }

        match self.items.pull_remote_to_local().await {
            Ok(()) => {
                info!("refresh completed");
                if manual {
                    self.events.emit(SyncEvent::SyncSucceeded);
                }
            }
            Err(e) => {
                warn!(error = %e, "item pull failed during refresh");
                self.events.emit(SyncEvent::SyncFailed {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Drive periodic background refreshes. Ticks that land while a refresh
    /// is still in flight are skipped rather than queued.
    pub fn spawn_periodic(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick fires immediately; callers run their own
            // initial refresh, so swallow it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if *orchestrator.refreshing.borrow() {
                    debug!("refresh already in flight, skipping periodic tick");
                    continue;
                }
                orchestrator.refresh(false).await;
            }
        })
    }
}
