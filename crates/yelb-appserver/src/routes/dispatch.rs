//! Single-endpoint request dispatch.
//!
//! The hosting platform delivers every request to `/`, so the real API path travels
//! in the `api_path` query parameter. Each request is handled independently:
//! method check, path extraction, normalization, then one table lookup.

use super::path::normalize;
use crate::config::PathSource;
use crate::db::Restaurant;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Query parameter carrying the API path.
pub const API_PATH_PARAM: &str = "api_path";

/// Query string of the single endpoint, `?api_path=/api/...`, kept as raw pairs.
///
/// Repeated parameters are allowed; the first `api_path` wins.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct ApiPathQuery {
    pairs: Vec<(String, String)>,
}

impl ApiPathQuery {
    pub fn api_path(&self) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == API_PATH_PARAM)
            .map(|(_, value)| value.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ApiPathQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// The operations reachable through the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRoute {
    PageViews,
    Hostname,
    Stats,
    Votes,
    Vote(Restaurant),
}

impl ApiRoute {
    pub const ALL: [ApiRoute; 8] = [
        ApiRoute::PageViews,
        ApiRoute::Hostname,
        ApiRoute::Stats,
        ApiRoute::Votes,
        ApiRoute::Vote(Restaurant::Ihop),
        ApiRoute::Vote(Restaurant::Chipotle),
        ApiRoute::Vote(Restaurant::Outback),
        ApiRoute::Vote(Restaurant::BucaDiBeppo),
    ];

    /// Look up a canonical path.
    pub fn from_path(path: &str) -> ApiResult<Self> {
        let route = match path {
            "/api/pageviews" => Self::PageViews,
            "/api/hostname" => Self::Hostname,
            "/api/getstats" => Self::Stats,
            "/api/getvotes" => Self::Votes,
            other => other
                .strip_prefix("/api/")
                .and_then(Restaurant::from_key)
                .map(Self::Vote)
                .ok_or_else(|| ApiError::InvalidApiPath(path.to_string()))?,
        };
        Ok(route)
    }

    pub fn path(&self) -> String {
        match self {
            Self::PageViews => "/api/pageviews".to_string(),
            Self::Hostname => "/api/hostname".to_string(),
            Self::Stats => "/api/getstats".to_string(),
            Self::Votes => "/api/getvotes".to_string(),
            Self::Vote(restaurant) => format!("/api/{}", restaurant.key()),
        }
    }

    /// Run the operation and render its body.
    pub async fn execute(&self, state: &AppState) -> String {
        match self {
            Self::PageViews => state.counter.increment_and_read().await.to_string(),
            Self::Hostname => local_hostname(),
            Self::Stats => {
                // Counter first, then hostname.
                let pageviews = state.counter.increment_and_read().await;
                let stats = Stats {
                    hostname: local_hostname(),
                    pageviews,
                };
                to_json_or_empty("stats", &stats)
            }
            Self::Votes => {
                let votes = state.votes.list_votes().await;
                to_json_or_empty("votes", &votes)
            }
            Self::Vote(restaurant) => state
                .votes
                .increment_and_read_count(*restaurant)
                .await
                .to_string(),
        }
    }
}

/// Body of `/api/getstats`.
#[derive(Debug, Serialize)]
pub struct Stats {
    pub hostname: String,
    pub pageviews: i64,
}

/// Host identifier of this process, empty when it cannot be determined.
pub fn local_hostname() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            error!(error = %e, "unable to get hostname");
            String::new()
        }
    }
}

fn to_json_or_empty<T: Serialize>(what: &str, value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        error!(error = %e, "unable to get {}", what);
        "{}".to_string()
    })
}

/// Raw, not yet normalized, API path of a request.
pub fn extract_path(source: PathSource, uri: &Uri, query: Option<&ApiPathQuery>) -> String {
    match source {
        PathSource::Query => query
            .and_then(ApiPathQuery::api_path)
            .unwrap_or_default()
            .to_string(),
        PathSource::Path => uri.path().to_string(),
    }
}

/// Resolve a request to a route without touching any store.
pub fn resolve(
    method: &Method,
    source: PathSource,
    uri: &Uri,
    query: Option<&ApiPathQuery>,
) -> ApiResult<ApiRoute> {
    if method != Method::GET {
        return Err(ApiError::InvalidMethod(method.to_string()));
    }

    let path = normalize(&extract_path(source, uri, query));
    ApiRoute::from_path(&path)
}

/// The one handler behind every method and path.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    query: Option<Query<ApiPathQuery>>,
) -> Response {
    let query = query.map(|Query(q)| q);
    let route = match resolve(&method, state.path_source, &uri, query.as_ref()) {
        Ok(route) => route,
        Err(e) => return e.into_response(),
    };

    debug!(route = ?route, "Dispatching request");
    let body = route.execute(&state).await;

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
