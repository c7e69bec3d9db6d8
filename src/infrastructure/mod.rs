//! Infrastructure: capability contracts, reference adapters, events

pub mod events;
pub mod memory;
pub mod stores;
