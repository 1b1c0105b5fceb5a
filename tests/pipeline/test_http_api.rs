// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP-level tests of the analyze and health endpoints

use super::common::*;
use axum::body::{to_bytes, Body};
use axum::extract::connect_info::ConnectInfo;
use axum::http::{Request, StatusCode};
use fabstir_review_node::api::{create_router, ApiConfig, AppState};
use fabstir_review_node::cache::ResultCache;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

fn test_state(rate_limit: usize) -> Arc<AppState> {
    let (search, _) = StaticSearchProvider::new(&["https://a.example.com/"]);
    let source = MapPageSource::new(&[("https://a.example.com/", &review_body("is reliable"))]);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let ai = StubAi::succeeding("primary", "Final report: 8/10.", calls);
    let cache = Arc::new(ResultCache::new(Duration::from_secs(3600), 100));

    let pipeline = Arc::new(build_pipeline(search, source, vec![ai], cache.clone()));

    let config = ApiConfig {
        rate_limit_max_requests: rate_limit,
        ..ApiConfig::default()
    };

    Arc::new(AppState::new(pipeline, cache, &config))
}

fn request(uri: &str, ip: [u8; 4]) -> Request<Body> {
    let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 40000))));
    request
}

#[tokio::test]
async fn test_analyze_rejects_invalid_product_before_streaming() {
    let router = create_router(test_state(10));

    let response = router
        .oneshot(request(
            "/analyze?product=%3Cscript%3Ealert(1)%3C/script%3E",
            [9, 9, 9, 1],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_analyze_rejects_missing_product_param() {
    let router = create_router(test_state(10));

    let response = router
        .oneshot(request("/analyze", [9, 9, 9, 2]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_rate_limits_per_client() {
    let state = test_state(1);

    let first = create_router(state.clone())
        .oneshot(request("/analyze?product=widget", [9, 9, 9, 3]))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = create_router(state.clone())
        .oneshot(request("/analyze?product=widget", [9, 9, 9, 3]))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different source address still gets through
    let other = create_router(state)
        .oneshot(request("/analyze?product=widget", [9, 9, 9, 4]))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_analyze_streams_sse_frames_to_completion() {
    let router = create_router(test_state(10));

    let response = router
        .oneshot(request("/analyze?product=Widget%20X200", [9, 9, 9, 5]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(text.contains("data:"));
    assert!(text.contains(r#""p":100"#));
    assert!(text.contains("Final report: 8/10."));
    assert!(!text.contains(r#""p":-1"#));
}

#[tokio::test]
async fn test_health_reports_providers_and_cache_size() {
    let router = create_router(test_state(10));

    let response = router
        .oneshot(request("/health", [9, 9, 9, 6]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert!(json["status"].is_string());
    assert_eq!(json["cache_size"], 0);
    // Mock providers are all available
    assert_eq!(json["static"], true);
    assert_eq!(json["primary"], true);
}
