use thiserror::Error;

/// Errors raised by the local key-value store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Local store unavailable: {0}")]
    Unavailable(String),
    #[error("Local store operation failed: {0}")]
    OperationFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for local store operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display() {
        let error = CacheError::Unavailable("permission denied".to_string());
        assert_eq!(error.to_string(), "Local store unavailable: permission denied");
    }

    #[test]
    fn test_operation_failed_display() {
        let error = CacheError::OperationFailed("rename failed".to_string());
        assert_eq!(error.to_string(), "Local store operation failed: rename failed");
    }

    #[test]
    fn test_serialization_display() {
        let error = CacheError::Serialization("invalid JSON".to_string());
        assert_eq!(error.to_string(), "Serialization error: invalid JSON");
    }
}
