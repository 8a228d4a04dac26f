//! Error types for the mapping store
use thiserror::Error;

/// Mapping store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// A custom button or mapping entry failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// State file read/write failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Import document could not be interpreted at all
    #[error("Unusable import document: {0}")]
    ImportFormat(String),

    /// State file exceeds the load size limit
    #[error("State file too large: {size} bytes (limit {limit})")]
    FileTooLarge {
        /// Actual size on disk
        size: u64,
        /// Configured limit
        limit: u64,
    },
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
