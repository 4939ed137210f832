/// Error types for provider operations
///
/// Every resource operation returns `ProviderResult<T>`. Server errors pass
/// through unchanged; local pre-condition failures name the offending key or
/// username so the host can show them as-is.

use redis::RedisError;
use redisform_shared::redis::RedisClientError;
use thiserror::Error;

/// Provider result type alias
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Unified provider error type
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The string key exists and the declaration does not allow overwriting it
    #[error("Redis key '{0}' already exists (set overridable = true to overwrite it)")]
    AlreadyExists(String),

    /// The resource is not present on the server
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Human-readable resource kind (e.g. "Redis user")
        kind: &'static str,
        /// Key or username
        id: String,
    },

    /// The user is built into the server and must not be removed
    #[error("Cannot delete the '{0}' user")]
    ProtectedUser(String),

    /// `ACL SETUSER <user>` without rules was rejected
    #[error("Failed to create Redis user '{username}': {source}")]
    UserCreateFailed {
        username: String,
        #[source]
        source: RedisError,
    },

    /// The full `ACL SETUSER` rule set was rejected
    #[error("Failed to update Redis user '{username}': {source}")]
    UserUpdateFailed {
        username: String,
        #[source]
        source: RedisError,
    },

    /// Declared attributes failed to decode or validate
    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    /// The host asked for a resource type this provider does not serve
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    /// Server-reported error, passed through verbatim
    #[error(transparent)]
    Redis(#[from] RedisError),

    /// Client construction or health check error
    #[error(transparent)]
    Client(#[from] RedisClientError),

    /// JSON encoding error at the host boundary
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// Creates a not-found error for a Redis key
    pub fn key_not_found(key: impl Into<String>) -> Self {
        ProviderError::NotFound {
            kind: "Redis key",
            id: key.into(),
        }
    }

    /// Creates a not-found error for an ACL user
    pub fn user_not_found(username: impl Into<String>) -> Self {
        ProviderError::NotFound {
            kind: "Redis user",
            id: username.into(),
        }
    }

    /// Returns true for errors raised before any command reached the server
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ProviderError::AlreadyExists(_)
                | ProviderError::ProtectedUser(_)
                | ProviderError::InvalidDeclaration(_)
                | ProviderError::UnknownResourceType(_)
        )
    }
}

impl From<validator::ValidationErrors> for ProviderError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ProviderError::InvalidDeclaration(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_names_key() {
        let err = ProviderError::AlreadyExists("app:greeting".to_string());
        let msg = err.to_string();
        assert!(msg.contains("already exists"));
        assert!(msg.contains("app:greeting"));
    }

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            ProviderError::user_not_found("alice").to_string(),
            "Redis user 'alice' not found"
        );
        assert_eq!(
            ProviderError::key_not_found("k").to_string(),
            "Redis key 'k' not found"
        );
    }

    #[test]
    fn test_redis_error_is_verbatim() {
        let source = RedisError::from((
            redis::ErrorKind::ResponseError,
            "An error was signalled by the server",
            "NOPERM this user has no permissions".to_string(),
        ));
        let expected = source.to_string();
        let err = ProviderError::from(source);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_precondition_classification() {
        assert!(ProviderError::ProtectedUser("default".to_string()).is_precondition());
        assert!(ProviderError::AlreadyExists("k".to_string()).is_precondition());
        assert!(!ProviderError::user_not_found("u").is_precondition());
    }
}
