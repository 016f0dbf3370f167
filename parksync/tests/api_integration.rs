//! HTTP API tests driven through the router without a socket.
//!
//! Run with: `cargo test --test api_integration`

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use parksync::api::router;
use parksync::app::ParkSyncApp;
use parksync::provider::{DataKind, Service};
use parksync::rate_limit::{QuotaTable, ServiceQuota};

use common::{app, unlimited, ScriptedFetcher};

async fn send(app: &Arc<ParkSyncApp>, method: Method, uri: &str) -> (StatusCode, HeaderMap, Value) {
    let response = router(Arc::clone(app))
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

#[tokio::test]
async fn test_health() {
    let app = app(&["YELL"], unlimited(), Duration::ZERO, Arc::default());

    let (status, _, body) = send(&app, Method::GET, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_refresh_then_read_artifact() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let app = app(&["YELL"], unlimited(), Duration::ZERO, fetcher.clone());

    let (status, _, body) = send(&app, Method::POST, "/api/refresh/YELL/details").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity_code"], "YELL");
    assert_eq!(body["data_kind"], "details");
    assert_eq!(body["service"], "nps");
    assert_eq!(body["bytes"], "YELL:details".len());
    assert!(body["fetched_at"].is_string());

    let (status, _, body) = send(&app, Method::GET, "/api/artifacts/YELL/details").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "nps");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_missing_artifact_is_404() {
    let app = app(&["YELL"], unlimited(), Duration::ZERO, Arc::default());

    let (status, _, body) = send(&app, Method::GET, "/api/artifacts/YELL/images").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_invalid_requests_are_400() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let app = app(&["YELL"], unlimited(), Duration::ZERO, fetcher.clone());

    let (status, _, body) = send(&app, Method::POST, "/api/refresh/YELL/weather").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");

    let (status, _, _) = send(&app, Method::POST, "/api/refresh/-YELL/images").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_rate_limited_is_429_with_retry_after() {
    let quotas = unlimited().with_quota(
        Service::Unsplash,
        ServiceQuota::new(1, Duration::from_secs(3600)),
    );
    let app = app(&["ENTITY1"], quotas, Duration::ZERO, Arc::default());

    let (status, _, body) = send(&app, Method::POST, "/api/refresh/ENTITY1/images").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remaining_quota"], 0);

    let (status, headers, body) = send(&app, Method::POST, "/api/refresh/ENTITY1/images").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["service"], "unsplash");

    let retry_after = body["retry_after_secs"].as_u64().unwrap();
    assert!((1..=3600).contains(&retry_after));
    assert_eq!(
        headers[header::RETRY_AFTER].to_str().unwrap(),
        retry_after.to_string()
    );
}

#[tokio::test]
async fn test_upstream_failure_is_502() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    fetcher.fail_on("YELL", DataKind::Terrain);
    let app = app(&["YELL"], unlimited(), Duration::ZERO, fetcher);

    let (status, _, body) = send(&app, Method::POST, "/api/refresh/YELL/terrain").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "upstream_error");
    assert_eq!(body["service"], "nasa");
}

#[tokio::test]
async fn test_quota_snapshot() {
    let quotas = QuotaTable::default();
    let app = app(&["YELL"], quotas, Duration::ZERO, Arc::default());

    send(&app, Method::POST, "/api/refresh/YELL/images").await;
    let (status, _, body) = send(&app, Method::GET, "/api/quota").await;

    assert_eq!(status, StatusCode::OK);
    let services = body["services"].as_array().unwrap();
    assert_eq!(services.len(), 3);
    let unsplash = services
        .iter()
        .find(|s| s["service"] == "unsplash")
        .unwrap();
    assert_eq!(unsplash["max_requests"], 50);
    assert_eq!(unsplash["used"], 1);
    assert_eq!(unsplash["remaining"], 49);
}

#[tokio::test]
async fn test_sweep_lifecycle() {
    let app = app(
        &["YELL", "ZION"],
        unlimited(),
        Duration::from_secs(3600),
        Arc::default(),
    );

    let (_, _, body) = send(&app, Method::GET, "/api/sweep").await;
    assert_eq!(body["state"], "idle");

    let (status, _, first) = send(&app, Method::POST, "/api/sweep").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["state"], "running");
    assert_eq!(first["total"], 10);

    let (_, _, second) = send(&app, Method::POST, "/api/sweep").await;
    assert_eq!(second["sweep_id"], first["sweep_id"]);

    send(&app, Method::DELETE, "/api/sweep").await;
    let handle = app.controller().current().unwrap();
    handle.wait().await;

    let (_, _, body) = send(&app, Method::GET, "/api/sweep").await;
    assert_eq!(body["state"], "cancelled");
}
