//! End-to-end tests of the single endpoint over in-process stores.

use aws_sdk_dynamodb::types::AttributeValue;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use yelb_appserver::{
    cache::{
        BackendSelection, ClusterCache, CounterCache, ManagedTableCache, MemoryCluster,
        MemoryTable,
    },
    config::PathSource,
    db::{MemoryVoteStore, Restaurant},
    routes::{create_router, local_hostname},
    AppState,
};

fn app_with(counter: CounterCache, votes: MemoryVoteStore, source: PathSource) -> Router {
    create_router(AppState::from_parts(counter, votes, source))
}

fn app() -> Router {
    app_with(
        CounterCache::in_memory(),
        MemoryVoteStore::new(),
        PathSource::Query,
    )
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let response = app.clone().oneshot(request(method, uri)).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get(app: &Router, api_path: &str) -> (StatusCode, String) {
    send(app, Method::GET, &format!("/?api_path={}", api_path)).await
}

#[tokio::test]
async fn test_every_known_path_succeeds() {
    let app = app();
    let paths = [
        "/api/pageviews",
        "/api/hostname",
        "/api/getstats",
        "/api/getvotes",
        "/api/ihop",
        "/api/chipotle",
        "/api/outback",
        "/api/bucadibeppo",
    ];

    for path in paths {
        let (status, _) = get(&app, path).await;
        assert_eq!(status, StatusCode::OK, "path {}", path);
    }
}

#[tokio::test]
async fn test_pageviews_counts_up() {
    let app = app();
    assert_eq!(get(&app, "/api/pageviews").await.1, "1");
    assert_eq!(get(&app, "/api/pageviews").await.1, "2");
    // getstats increments too
    let (_, stats) = get(&app, "/api/getstats").await;
    let stats: serde_json::Value = serde_json::from_str(&stats).unwrap();
    assert_eq!(stats["pageviews"], 3);
    assert_eq!(get(&app, "/api/pageviews").await.1, "4");
}

#[tokio::test]
async fn test_pageviews_continue_from_seeded_cluster() {
    let cluster = MemoryCluster::new();
    cluster.seed("pageviews", "41");
    let counter = CounterCache::new(ClusterCache::new(cluster), BackendSelection::Cluster);
    let app = app_with(counter, MemoryVoteStore::new(), PathSource::Query);

    assert_eq!(get(&app, "/api/pageviews").await.1, "42");
}

#[tokio::test]
async fn test_pageviews_on_managed_table() {
    let counter = CounterCache::new(
        ManagedTableCache::new(MemoryTable::with_value(AttributeValue::S("9".into()))),
        BackendSelection::ManagedTable {
            table: "yelb-pageviews".into(),
        },
    );
    let app = app_with(counter, MemoryVoteStore::new(), PathSource::Query);

    assert_eq!(get(&app, "/api/pageviews").await.1, "10");
    assert_eq!(get(&app, "/api/pageviews").await.1, "11");
}

#[tokio::test]
async fn test_hostname_is_raw_text() {
    let app = app();
    let (status, body) = get(&app, "/api/hostname").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, local_hostname());
}

#[tokio::test]
async fn test_getstats_body() {
    let app = app();
    let (status, body) = get(&app, "/api/getstats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({ "hostname": local_hostname(), "pageviews": 1 }).to_string()
    );
}

#[tokio::test]
async fn test_getvotes_fixed_order() {
    let votes = MemoryVoteStore::with_counts([
        (Restaurant::Ihop, 3),
        (Restaurant::Chipotle, 1),
        (Restaurant::BucaDiBeppo, 2),
    ]);
    let app = app_with(CounterCache::in_memory(), votes, PathSource::Query);

    let (status, body) = get(&app, "/api/getvotes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"[{"name":"ihop","value":3},{"name":"chipotle","value":1},{"name":"outback","value":0},{"name":"bucadibeppo","value":2}]"#
    );
}

#[tokio::test]
async fn test_vote_increments_one_restaurant() {
    let votes = MemoryVoteStore::with_counts([(Restaurant::Outback, 7)]);
    let app = app_with(CounterCache::in_memory(), votes, PathSource::Query);

    assert_eq!(get(&app, "/api/outback").await.1, "8");
    assert_eq!(get(&app, "/api/ihop").await.1, "1");

    let (_, body) = get(&app, "/api/getvotes").await;
    let votes: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(votes[0]["value"], 1);
    assert_eq!(votes[2]["value"], 8);
}

#[tokio::test]
async fn test_messy_path_is_normalized() {
    let app = app();
    let (status, body) = get(&app, "//api///pageviews/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "1");
}

#[tokio::test]
async fn test_unknown_path_rejected() {
    let app = app();
    let (status, body) = get(&app, "/api/nothing").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error": "'/api/nothing' is an invalid api_path"}"#);
}

#[tokio::test]
async fn test_missing_api_path_rejected() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error": "'/' is an invalid api_path"}"#);
}

#[tokio::test]
async fn test_non_get_rejected_without_side_effects() {
    let app = app();
    for method in [Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS] {
        let (status, body) = send(&app, method.clone(), "/?api_path=/api/pageviews").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            format!(
                r#"{{"error": "'{}' is an invalid method.  only GET supported."}}"#,
                method
            )
        );
    }
    assert_eq!(get(&app, "/api/pageviews").await.1, "1");
}

#[tokio::test]
async fn test_cors_and_content_type_on_every_response() {
    let app = app();
    for uri in ["/?api_path=/api/hostname", "/?api_path=/nope"] {
        let response = app
            .clone()
            .oneshot(request(Method::GET, uri))
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Authorization,Accepts,Content-Type,X-CSRF-Token,X-Requested-With"
        );
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert!(headers.contains_key("x-request-id"));
    }
}

#[tokio::test]
async fn test_path_mode_reads_request_path() {
    let app = app_with(
        CounterCache::in_memory(),
        MemoryVoteStore::new(),
        PathSource::Path,
    );

    let (status, body) = send(&app, Method::GET, "/api/chipotle").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "1");

    // the query parameter is ignored in this mode
    let (status, _) = send(&app, Method::GET, "/?api_path=/api/chipotle").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_repeated_api_path_uses_first() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::GET,
        "/?api_path=/api/hostname&api_path=/api/ihop",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, local_hostname());

    // the second value must not have been executed
    let (_, votes) = get(&app, "/api/getvotes").await;
    let votes: serde_json::Value = serde_json::from_str(&votes).unwrap();
    assert_eq!(votes[0]["value"], 0);
}
