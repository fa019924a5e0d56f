//! Bulk card exchange in CSV form
//!
//! Columns: `english,german,article,plural,example,notes`, header row
//! required. The adapter only consumes the store's public operations;
//! quoting and escaping are the csv crate's concern.

mod export;
mod import;

use thiserror::Error;

use crate::storage::StoreError;

pub use export::export_csv;
pub use import::{import_csv, ImportReport};

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, TransferError>;
