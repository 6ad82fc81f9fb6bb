//! Error types for IDM gateway operations.
//!
//! Errors are layered the same way the request flows: [`ValidationError`] is
//! raised locally before anything reaches the directory, the directory client
//! reports [`ClientError`](crate::directory::ClientError), and [`IdmError`]
//! is what the orchestrator hands back to callers.

use crate::directory::ClientError;

/// Main error type for gateway operations.
///
/// Every variant is classified as either a client mistake or a backend
/// failure, see [`IdmError::is_client_error`].
#[derive(Debug, thiserror::Error)]
pub enum IdmError {
    /// Malformed request parameters, body, or continuation token
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The requested entry, attribute or token does not exist
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// The cursor behind a continuation token has expired or been exhausted
    #[error("Paging cursor expired at {expires}")]
    TokenExpired { expires: String },

    /// The directory refused a create because the object already exists
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The directory rejected the operation (bad filter, constraint violation)
    #[error("Directory fault: {message}")]
    RemoteFault { message: String },

    /// The directory could not be reached or timed out
    #[error("Directory unavailable: {message}")]
    Unavailable { message: String },

    /// Lazily creating the continuation token schema failed
    #[error("Failed to provision continuation token schema: {message}")]
    SchemaProvisionFailure {
        message: String,
        #[source]
        source: Option<ClientError>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A failure inside the gateway itself
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

/// Local validation failures.
///
/// None of these ever reach the directory; they always map to a 4xx response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A sort token did not split into exactly `AttributeName:SortDirection`
    #[error(
        "sort must be a comma separated list of `AttributeName:SortDirection` pairs, e.g. `DisplayName:Ascending,Name:Descending` (got '{sort}')"
    )]
    MalformedSort { sort: String },

    /// The continuation token could not be decoded into a paging cursor
    #[error("Unrecognized continuation token '{token}': {reason}")]
    UnrecognizedToken { token: String, reason: String },

    /// Page size was zero or not a number
    #[error("pageSize must be a positive integer (got '{value}')")]
    InvalidPageSize { value: String },

    /// A request body could not be interpreted as a directory entry
    #[error("Invalid entry: {message}")]
    InvalidEntry { message: String },

    /// A change directive is not applicable
    #[error("Invalid change for attribute '{attribute}': {message}")]
    InvalidChange { attribute: String, message: String },

    /// General validation error with custom message
    #[error("Validation failed: {message}")]
    Custom { message: String },
}

impl IdmError {
    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a schema provisioning error wrapping the directory failure
    pub fn schema_provision(message: impl Into<String>, source: ClientError) -> Self {
        Self::SchemaProvisionFailure {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NotFound { .. }
                | Self::TokenExpired { .. }
                | Self::Conflict { .. }
        )
    }
}

impl From<ClientError> for IdmError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::NotFound { object_id } => Self::not_found(object_id),
            ClientError::AlreadyExists { message } => Self::Conflict { message },
            // Only cursors expire, so this surfaces as a token problem.
            ClientError::Expired { expires } => Self::TokenExpired { expires },
            ClientError::RemoteFault { message } => Self::RemoteFault { message },
            ClientError::Unavailable { message } | ClientError::Timeout { message } => {
                Self::Unavailable { message }
            }
        }
    }
}

impl ValidationError {
    /// Create a malformed sort error
    pub fn malformed_sort(sort: impl Into<String>) -> Self {
        Self::MalformedSort { sort: sort.into() }
    }

    /// Create an unrecognized token error
    pub fn unrecognized_token(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnrecognizedToken {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid entry error
    pub fn invalid_entry(message: impl Into<String>) -> Self {
        Self::InvalidEntry {
            message: message.into(),
        }
    }

    /// Create a custom validation error
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

// Result type aliases for convenience
pub type IdmResult<T> = Result<T, IdmError>;
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_sort_message_explains_format() {
        let error = ValidationError::malformed_sort("BadSortValue");
        let message = error.to_string();
        assert!(message.starts_with("sort must be a comma separated list"));
        assert!(message.contains("BadSortValue"));
    }

    #[test]
    fn test_validation_is_client_error() {
        let error = IdmError::from(ValidationError::custom("nope"));
        assert!(error.is_client_error());
        assert!(error.to_string().contains("Validation error"));
    }

    #[test]
    fn test_client_error_mapping() {
        let error = IdmError::from(ClientError::not_found("abc"));
        assert!(matches!(error, IdmError::NotFound { ref resource } if resource == "abc"));

        let error = IdmError::from(ClientError::Expired {
            expires: "2020-01-01T00:00:00Z".to_string(),
        });
        assert!(matches!(error, IdmError::TokenExpired { .. }));
        assert!(error.is_client_error());

        let error = IdmError::from(ClientError::Timeout {
            message: "slow".to_string(),
        });
        assert!(matches!(error, IdmError::Unavailable { .. }));
        assert!(!error.is_client_error());
    }

    #[test]
    fn test_schema_provision_keeps_source() {
        let error = IdmError::schema_provision(
            "creating ETag type",
            ClientError::RemoteFault {
                message: "denied".to_string(),
            },
        );
        assert!(!error.is_client_error());
        assert!(std::error::Error::source(&error).is_some());
    }
}
