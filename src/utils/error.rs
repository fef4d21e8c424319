//! Error handling module
//!
//! Defines error types and handling logic used in the project

use crate::services::client::UpstreamError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream API call failed, with the operation that issued it
    #[error("{context}: {source}")]
    Upstream {
        context: String,
        #[source]
        source: UpstreamError,
    },

    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Writing the token file failed
    #[error("Failed to save token: {0}")]
    Persist(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// JSON error body used by the JSON endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl AppError {
    /// Wrap an upstream failure with the operation that issued it
    pub fn upstream(context: impl Into<String>, source: UpstreamError) -> Self {
        AppError::Upstream {
            context: context.into(),
            source,
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { .. }
            | AppError::Persist(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "invalid_request_error",
            AppError::NotFound(_) => "not_found_error",
            AppError::Upstream {
                source: UpstreamError::InvalidCredential,
                ..
            } => "invalid_credential_error",
            AppError::Upstream {
                source: UpstreamError::Transport { .. },
                ..
            } => "transport_error",
            AppError::Upstream {
                source: UpstreamError::Decode(_),
                ..
            } => "parse_error",
            AppError::Upstream { .. } => "upstream_error",
            AppError::Persist(_) | AppError::Internal(_) => "internal_error",
        }
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(
            self,
            AppError::Validation(_)
                | AppError::NotFound(_)
                | AppError::Upstream {
                    source: UpstreamError::InvalidCredential,
                    ..
                }
        )
    }

    /// Convert to the JSON error body
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            success: false,
            error: self.to_string(),
        }
    }

    /// Respond with a JSON body instead of plain text
    pub fn into_json_response(self) -> Response {
        let status = self.status_code();
        self.log(status);
        (status, Json(self.to_error_body())).into_response()
    }

    fn log(&self, status: StatusCode) {
        if self.should_log_details() {
            tracing::error!("Application error: {} - Status code: {}", self, status);
        } else {
            tracing::warn!("Client error: {} ({}) - Status code: {}", self, self.error_type(), status);
        }
    }
}

/// Plain-text error responses for the HTML pages
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        self.log(status);
        (status, self.to_string()).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Validation("test".to_string()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("test".to_string()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::upstream("Failed to fetch products", UpstreamError::Unsuccessful).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::Internal("test".to_string()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_upstream_message_has_context() {
        let err = AppError::upstream("Failed to fetch products", UpstreamError::Unsuccessful);
        assert_eq!(err.to_string(), "Failed to fetch products: API request was not successful");
        assert_eq!(err.error_type(), "upstream_error");
    }

    #[test]
    fn test_invalid_credential_is_not_logged_in_detail() {
        let err = AppError::upstream("Invalid token", UpstreamError::InvalidCredential);
        assert_eq!(err.error_type(), "invalid_credential_error");
        assert!(!err.should_log_details());
    }
}
