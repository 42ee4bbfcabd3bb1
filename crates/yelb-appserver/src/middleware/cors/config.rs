//! CORS header values.

use axum::http::HeaderValue;

/// Headers browsers accept from the single endpoint.
const DEFAULT_ALLOWED_HEADERS: &str =
    "Authorization,Accepts,Content-Type,X-CSRF-Token,X-Requested-With";

/// CORS configuration, applied verbatim to every response.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// `Access-Control-Allow-Origin`.
    pub allow_origin: HeaderValue,
    /// `Access-Control-Allow-Headers`.
    pub allow_headers: HeaderValue,
    /// `Access-Control-Allow-Methods`.
    pub allow_methods: HeaderValue,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
            allow_headers: HeaderValue::from_static(DEFAULT_ALLOWED_HEADERS),
            allow_methods: HeaderValue::from_static("GET"),
        }
    }
}

impl CorsConfig {
    /// Any origin, GET only.
    pub fn permissive() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = CorsConfig::default();
        assert_eq!(config.allow_origin, "*");
        assert_eq!(config.allow_methods, "GET");
        assert_eq!(
            config.allow_headers,
            "Authorization,Accepts,Content-Type,X-CSRF-Token,X-Requested-With"
        );
    }
}
