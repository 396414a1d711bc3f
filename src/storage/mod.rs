//! Storage module for persisting enriched records
//!
//! Records are kept in a CSV file with one row per organization. Every save
//! rotates a `.bak` copy so a failed or corrupted write can be recovered from
//! the last good state.

mod csv_store;
mod traits;

pub use csv_store::CsvRecordStore;
pub use traits::{RecordStore, StoreError, StoreResult};

use std::path::Path;

/// Opens the CSV record store at the given path
///
/// The file is not touched until the first load or save.
pub fn open_store(path: &Path) -> CsvRecordStore {
    CsvRecordStore::new(path)
}
