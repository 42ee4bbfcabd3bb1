//! Request logging middleware.

use axum::{body::Body, extract::Request, http::Response};
use futures::future::BoxFuture;
use std::{
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};
use tracing::{info, span, Instrument, Level};
use uuid::Uuid;

/// Request logging layer.
#[derive(Clone)]
pub struct LoggingLayer {
    enabled: bool,
}

impl Default for LoggingLayer {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl LoggingLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the started/completed events off without removing the layer.
    pub fn enabled(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddleware {
            inner,
            enabled: self.enabled,
        }
    }
}

#[derive(Clone)]
pub struct LoggingMiddleware<S> {
    inner: S,
    enabled: bool,
}

impl<S> Service<Request> for LoggingMiddleware<S>
where
    S: Service<Request, Response = Response<Body>, Error = std::convert::Infallible>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let mut inner = self.inner.clone();

        if !self.enabled {
            return Box::pin(async move { inner.call(req).await });
        }

        let method = req.method().clone();
        let uri = req.uri().clone();

        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let client_ip = req
            .headers()
            .get("x-forwarded-for")
            .or_else(|| req.headers().get("x-real-ip"))
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let span = span!(
            Level::INFO,
            "request",
            request_id = %request_id,
            method = %method,
            path = %uri.path(),
            client_ip = %client_ip,
        );

        Box::pin(
            async move {
                let start = Instant::now();
                info!(event = "request_started", uri = %uri);

                let response = inner.call(req).await?;

                info!(
                    event = "request_completed",
                    status = response.status().as_u16(),
                    duration_ms = start.elapsed().as_millis() as u64,
                );

                Ok(response)
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    async fn ok(_req: Request) -> Result<Response<Body>, Infallible> {
        Ok(Response::new(Body::from("7")))
    }

    #[tokio::test]
    async fn test_passes_response_through() {
        for layer in [LoggingLayer::new(), LoggingLayer::enabled(false)] {
            let service = layer.layer(service_fn(ok));
            let req = Request::builder()
                .uri("/?api_path=/api/pageviews")
                .header("x-forwarded-for", "10.0.0.1, 10.0.0.2")
                .body(Body::empty())
                .unwrap();

            let response = service.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
