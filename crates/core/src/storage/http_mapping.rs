//! Pure functions for mapping remote HTTP responses to [`RemoteError`]s.

use super::RemoteError;

/// Maps a non-success HTTP status from the remote store to a [`RemoteError`].
///
/// - 401, 403 -> `Rejected` (bad or missing credentials, rules denied)
/// - 412 -> `Conflict` (the `if-match` precondition failed)
/// - 400, 404 and other 4xx -> `Rejected`
/// - 5xx and anything else -> `Unavailable`
///
/// # Examples
///
/// ```
/// use hymnal_core::storage::{remote_error_from_status, RemoteError};
///
/// let error = remote_error_from_status(412, "user_favorites/u1");
/// assert_eq!(error, RemoteError::Conflict("user_favorites/u1".to_string()));
/// ```
pub fn remote_error_from_status(status: u16, path: &str) -> RemoteError {
    match status {
        412 => RemoteError::Conflict(path.to_string()),
        400..=499 => RemoteError::Rejected(format!("{status} at {path}")),
        _ => RemoteError::Unavailable(format!("{status} at {path}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_are_rejected() {
        assert_eq!(
            remote_error_from_status(401, "users/u1"),
            RemoteError::Rejected("401 at users/u1".to_string())
        );
        assert!(matches!(
            remote_error_from_status(403, "users/u1"),
            RemoteError::Rejected(_)
        ));
    }

    #[test]
    fn test_precondition_failed_is_conflict() {
        assert_eq!(
            remote_error_from_status(412, "user_favorites/u1"),
            RemoteError::Conflict("user_favorites/u1".to_string())
        );
    }

    #[test]
    fn test_server_errors_are_unavailable() {
        assert!(matches!(
            remote_error_from_status(503, "bible/books"),
            RemoteError::Unavailable(_)
        ));
        assert!(matches!(
            remote_error_from_status(500, "bible/books"),
            RemoteError::Unavailable(_)
        ));
    }
}
