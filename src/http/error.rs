//! HTTP rendering of gateway errors.
//!
//! | Error                                         | Status |
//! |-----------------------------------------------|--------|
//! | `Validation`                                  | 400    |
//! | `NotFound`                                    | 404    |
//! | `Conflict`                                    | 409    |
//! | `TokenExpired`                                | 410    |
//! | `RemoteFault`, `SchemaProvisionFailure`,      |        |
//! | `Json`, `Internal`                            | 500    |
//! | `Unavailable`                                 | 503    |
//!
//! Bodies are plain text. A validation error's body is just its message, so
//! callers see e.g. the expected `sort` format verbatim.

use crate::error::IdmError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::warn;

impl IdmError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdmError::Validation(_) => StatusCode::BAD_REQUEST,
            IdmError::NotFound { .. } => StatusCode::NOT_FOUND,
            IdmError::TokenExpired { .. } => StatusCode::GONE,
            IdmError::Conflict { .. } => StatusCode::CONFLICT,
            IdmError::RemoteFault { .. }
            | IdmError::SchemaProvisionFailure { .. }
            | IdmError::Json(_)
            | IdmError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            IdmError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for IdmError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            IdmError::Validation(error) => error.to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            warn!("Request failed with {}: {}", status, body);
        }

        (status, body).into_response()
    }
}
