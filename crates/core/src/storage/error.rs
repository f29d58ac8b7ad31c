use thiserror::Error;

use crate::access::DenialReason;
use crate::cache::SerializationError;

/// Errors raised by a remote document store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
    #[error("Remote store rejected the request: {0}")]
    Rejected(String),
    #[error("Conflicting write at {0}")]
    Conflict(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for remote store operations.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// The error type of every repository and service operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Access denied: {0}")]
    AccessDenied(DenialReason),
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("Corrupt data: {0}")]
    Corrupt(String),
}

impl RepositoryError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Stable code callers branch on.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AccessDenied(reason) => reason.code(),
            Self::RemoteUnavailable(_) => "offline",
            Self::Corrupt(_) => "corrupt",
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Self::RemoteUnavailable(_))
    }
}

impl From<RemoteError> for RepositoryError {
    fn from(error: RemoteError) -> Self {
        match error {
            RemoteError::Serialization(msg) => Self::Corrupt(msg),
            other => Self::RemoteUnavailable(other.to_string()),
        }
    }
}

impl From<SerializationError> for RepositoryError {
    fn from(error: SerializationError) -> Self {
        Self::Corrupt(error.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
