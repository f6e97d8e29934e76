//! Volatile storage. Nothing outlives the process.

pub mod memory;

pub use memory::{ChargerStateStore, SharedChargerStateStore};
