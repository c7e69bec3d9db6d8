//! Event bus for sync lifecycle notifications
//!
//! UI layers subscribe to surface toasts and refresh indicators; the engine
//! never blocks on listeners.

use tokio::sync::broadcast;

/// Sync lifecycle events
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A refresh cycle started
    RefreshStarted {
        /// Triggered by an explicit user action (pull-to-refresh) rather
        /// than the periodic schedule
        manual: bool,
    },

    /// A refresh cycle finished (success or failure)
    RefreshFinished,

    /// The pull step completed without error
    SyncSucceeded,

    /// A user-visible sync failure message
    SyncFailed { message: String },

    /// The effective category set changed
    CategoriesChanged,
}

/// Broadcast bus for [`SyncEvent`]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event; send errors (no receivers) are ignored
    pub fn emit(&self, event: SyncEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
