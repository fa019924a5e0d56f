//! wortkarte: German vocabulary trainer with spaced repetition
//!
//! The library is split into three layers:
//! - [`vocab`]: data models, the scheduling engine, the session queue
//!   builder and the study session state machine
//! - [`storage`]: the SQLite-backed deck/card store and snapshot
//!   backups
//! - [`transfer`]: CSV import/export built on the store's public
//!   operations
//!
//! There is no global state: callers own a [`storage::VocabStore`] and
//! thread it (plus an explicit clock value and random source where
//! needed) through the APIs.

pub mod storage;
pub mod transfer;
pub mod vocab;

pub use storage::{StoreError, VocabStore};
pub use vocab::{Grade, StudyMode, StudySession};
