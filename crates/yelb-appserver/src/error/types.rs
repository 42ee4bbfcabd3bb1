//! API error types.

use axum::http::StatusCode;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Request-shaped problems reported back to the caller.
///
/// Store failures never surface here; they degrade to default values instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("'{0}' is an invalid method.  only GET supported.")]
    InvalidMethod(String),

    #[error("'{0}' is an invalid api_path")]
    InvalidApiPath(String),
}

impl ApiError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidMethod(_) | Self::InvalidApiPath(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidMethod(_) => "invalid_method",
            Self::InvalidApiPath(_) => "invalid_api_path",
        }
    }
}
