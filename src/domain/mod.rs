//! Domain models for the inventory catalogue

pub mod category;
pub mod item;
pub mod taxonomy;

pub use category::{Category, GLOBAL_OWNER};
pub use item::{Item, LendingState};
pub use taxonomy::{CategoryKey, Locale};
