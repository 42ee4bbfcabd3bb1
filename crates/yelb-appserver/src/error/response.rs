//! Error response implementation.

use super::types::ApiError;
use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use tracing::warn;

impl ApiError {
    /// Response body: `{"error": "<message>"}`.
    pub fn body(&self) -> String {
        // a plain string always serializes
        let message = serde_json::to_string(&self.to_string())
            .unwrap_or_else(|_| "\"\"".to_string());
        format!("{{\"error\": {}}}", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(
            error = %self,
            code = self.error_code(),
            "Rejected request"
        );

        (
            self.status_code(),
            [(header::CONTENT_TYPE, "application/json")],
            self.body(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_invalid_method_body() {
        let err = ApiError::InvalidMethod("POST".into());
        assert_eq!(
            err.body(),
            r#"{"error": "'POST' is an invalid method.  only GET supported."}"#
        );
    }

    #[test]
    fn test_invalid_path_body() {
        let err = ApiError::InvalidApiPath("/api/nope".into());
        assert_eq!(err.body(), r#"{"error": "'/api/nope' is an invalid api_path"}"#);
    }

    #[test]
    fn test_body_escapes_quotes() {
        let err = ApiError::InvalidApiPath("/a\"b".into());
        let parsed: serde_json::Value = serde_json::from_str(&err.body()).unwrap();
        assert_eq!(parsed["error"], "'/a\"b' is an invalid api_path");
    }

    #[test]
    fn test_status_is_bad_request() {
        let response = ApiError::InvalidMethod("DELETE".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
