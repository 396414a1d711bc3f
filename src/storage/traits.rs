//! Storage traits and error types

use crate::record::Record;
use thiserror::Error;

/// Errors that can occur during record persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Record file is corrupt: {0}")]
    Corrupt(String),

    #[error("Write failed ({reason}); restored from backup: {restored}")]
    WriteFailed { reason: String, restored: bool },
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for record persistence backends
///
/// Implementations must leave a recoverable state on disk after at most one
/// failed write.
pub trait RecordStore: Send {
    /// Loads every persisted record
    ///
    /// Returns an empty set when nothing has been saved yet.
    fn load(&self) -> StoreResult<Vec<Record>>;

    /// Replaces the persisted record set
    fn save(&self, records: &[Record]) -> StoreResult<()>;
}
