//! Common error type shared by the store and the API layer

use thiserror::Error;

/// Result type for inventory operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while manipulating the inventory
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity with the given id does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind (home, level, room, ...)
        kind: &'static str,
        /// Primary key that was looked up
        id: i64,
    },

    /// Uniqueness or referential-integrity violation
    #[error("{0}")]
    Conflict(String),

    /// Invalid payload (missing required field, bad reference, oversized value)
    #[error("{0}")]
    InvalidInput(String),

    /// Snapshot file I/O failed
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization failed
    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::NotFound { .. } => 404,
            StoreError::Conflict(_) => 409,
            StoreError::InvalidInput(_) => 400,
            StoreError::Io(_) | StoreError::Format(_) => 500,
        }
    }
}
