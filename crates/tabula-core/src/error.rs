//! Error types for Tabula

use std::time::Duration;

use thiserror::Error;

use crate::{ColumnId, RowId, StructuralOp};

/// Core error type for table editing operations
///
/// Every variant except `Storage`, `Io` and `Serialization` is local and
/// synchronous: the operation that produced it left the working copy exactly
/// as it was before the call.
#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("Columns are locked: cannot {0}")]
    StructureLocked(StructuralOp),

    #[error("Cannot remove the last remaining column")]
    LastColumn,

    #[error("Unknown column: {0}")]
    UnknownColumn(ColumnId),

    #[error("Unknown row: {0}")]
    UnknownRow(RowId),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Table is read-only while viewing")]
    ReadOnly,

    #[error("A save is already in progress")]
    SaveInFlight,

    #[error("Index {index} is out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Rows cannot be reordered while a sort is active")]
    SortActive,

    #[error("No drag in progress")]
    NoDrag,

    #[error("Invalid value for column '{column}': {message}")]
    InvalidValue { column: String, message: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Confirmation is not available yet ({remaining:?} remaining)")]
    CooldownActive { remaining: Duration },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TabulaError {
    /// Whether the error came from the persistence round trip rather than a
    /// local model check. The session stays in `Editing` either way.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            TabulaError::Storage(_) | TabulaError::Io(_) | TabulaError::Serialization(_)
        )
    }
}

/// Result type alias for Tabula operations
pub type Result<T> = std::result::Result<T, TabulaError>;
