//! The sync engine: protocols, orchestration and startup preparation

pub mod bootstrap;
pub mod category_sync;
pub mod item_sync;
pub mod orchestrator;

pub use category_sync::CategoryService;
pub use item_sync::{ItemSyncService, SyncError};
pub use orchestrator::SyncOrchestrator;
