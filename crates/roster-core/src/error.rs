//! Error types for roster

use thiserror::Error;

/// Errors raised while resolving identities or talking to host collaborators
///
/// None of these are fatal to the host process. Callers log them and carry
/// on with the operation aborted or the offending input dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// Malformed raw identity string (e.g. `"-Realm"`)
    #[error("Invalid player name: {0:?}")]
    InvalidName(String),

    /// Realm is neither the current realm nor connected to it
    #[error("Unknown realm {realm:?} for player {name:?}")]
    UnknownRealm { name: String, realm: String },

    /// A required live-list or persistence handle is absent or malformed
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(String),
}

impl RosterError {
    /// Create a new InvalidName error
    pub fn invalid_name(raw: impl Into<String>) -> Self {
        Self::InvalidName(raw.into())
    }

    /// Create a new UnknownRealm error
    pub fn unknown_realm(name: impl Into<String>, realm: impl Into<String>) -> Self {
        Self::UnknownRealm {
            name: name.into(),
            realm: realm.into(),
        }
    }

    /// Create a new MissingCollaborator error
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingCollaborator(what.into())
    }
}

/// Result type for roster operations
pub type RosterResult<T> = Result<T, RosterError>;
