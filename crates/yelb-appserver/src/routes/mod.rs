//! Route configuration for the Yelb application server.
//!
//! There is one endpoint. Every method and path falls through to [`dispatch`],
//! which picks the operation from the `api_path` query parameter.

pub mod dispatch;
pub mod path;

pub use dispatch::{dispatch, local_hostname, ApiRoute, Stats};
pub use path::normalize;

use crate::{
    middleware::{CorsLayer, LoggingLayer},
    state::AppState,
};
use axum::{http::HeaderName, Router};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the application router with request logging on.
pub fn create_router(state: AppState) -> Router {
    create_router_with_logging(state, true)
}

/// Create the application router.
pub fn create_router_with_logging(state: AppState, log_requests: bool) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let common_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(TraceLayer::new_for_http())
        .layer(LoggingLayer::enabled(log_requests))
        .layer(CorsLayer::permissive());

    Router::new()
        .fallback(dispatch)
        .layer(common_middleware)
        .with_state(state)
}
