//! Error types for roster-storage

use thiserror::Error;

/// Errors that can occur while loading or saving persisted state
///
/// A missing store is not an error: [`crate::StateStore::load`] reports it
/// as `Ok(None)` and the caller starts from defaults.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error while reading or writing the store
    #[error("I/O error: {0}")]
    Io(String),

    /// Error during serialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error during deserialization
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl StorageError {
    /// Create a new Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create a new Deserialization error
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
