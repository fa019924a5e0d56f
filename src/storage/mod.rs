//! Durable storage for decks and cards

pub mod backup;
pub mod store;

pub use backup::{read_snapshot, write_snapshot, Snapshot, SNAPSHOT_VERSION};
pub use store::{Result, StoreError, VocabStore};
