//! Error types for the session coordinator

use thiserror::Error;

/// Errors that can occur in the session coordinator
#[derive(Debug, Error)]
pub enum NodeError {
    /// Identity or collaborator error
    #[error("Roster error: {0}")]
    Roster(#[from] roster_core::RosterError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] roster_storage::StorageError),

    /// Logging setup error
    #[error("Logging error: {0}")]
    Logging(#[from] roster_logging::LoggingError),

    /// Unparseable command text
    #[error("Command error: {0}")]
    Command(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for NodeError {
    fn from(e: std::io::Error) -> Self {
        NodeError::Io(e.to_string())
    }
}

/// Result type for session operations
pub type NodeResult<T> = Result<T, NodeError>;
