//! Errors reported by directory clients.
//!
//! These describe what went wrong at the directory boundary and carry no
//! HTTP or gateway semantics; [`IdmError`](crate::IdmError) decides how each
//! one is surfaced.

/// Failures reported by a [`DirectoryClient`](super::DirectoryClient).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No object with the given identifier exists.
    #[error("Object not found: {object_id}")]
    NotFound { object_id: String },

    /// A create collided with an object that must be unique.
    #[error("Object already exists: {message}")]
    AlreadyExists { message: String },

    /// A paging context was pulled after its expiry instant.
    #[error("Paging context expired at {expires}")]
    Expired { expires: String },

    /// The directory rejected the request.
    #[error("Directory fault: {message}")]
    RemoteFault { message: String },

    /// The directory could not be reached.
    #[error("Directory unavailable: {message}")]
    Unavailable { message: String },

    /// The directory did not answer in time.
    #[error("Directory request timed out: {message}")]
    Timeout { message: String },
}

impl ClientError {
    pub fn not_found(object_id: impl Into<String>) -> Self {
        Self::NotFound {
            object_id: object_id.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
        }
    }

    pub fn fault(message: impl Into<String>) -> Self {
        Self::RemoteFault {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ClientError::not_found("abc").to_string(),
            "Object not found: abc"
        );
        assert_eq!(
            ClientError::fault("unsupported filter").to_string(),
            "Directory fault: unsupported filter"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::unavailable("down").is_transient());
        assert!(
            ClientError::Timeout {
                message: "30s".into()
            }
            .is_transient()
        );
        assert!(!ClientError::already_exists("ETag").is_transient());
        assert!(!ClientError::not_found("x").is_transient());
    }
}
