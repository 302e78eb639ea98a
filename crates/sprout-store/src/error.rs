//! Error types for sprout-store

use thiserror::Error;

/// Errors that can occur in backend storage operations
///
/// These never cross the [`crate::DurableStore`] surface; the store
/// converts them into failure sentinels and logs them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error during a storage operation
    #[error("I/O error: {0}")]
    Io(String),

    /// The backing storage is unavailable for this session
    #[error("Storage unavailable")]
    Unavailable,

    /// Error during serialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error during deserialization
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            StoreError::Deserialization(err.to_string())
        } else {
            StoreError::Serialization(err.to_string())
        }
    }
}
