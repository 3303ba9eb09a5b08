//! # Engine Errors

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Storage engine errors
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Unordered bulk write that applied some operations and failed others
    #[error("Bulk write failed for {failed} operation(s) after applying {applied}: {message}")]
    BulkWrite {
        failed: usize,
        applied: usize,
        message: String,
    },

    #[error("Collection lock poisoned: {0}")]
    Poisoned(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl EngineError {
    /// Returns true if the error left some writes applied
    pub fn is_partial(&self) -> bool {
        matches!(self, EngineError::BulkWrite { applied, .. } if *applied > 0)
    }
}
