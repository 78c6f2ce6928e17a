// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/dashboard (empty + after refresh)
// - POST /api/refresh (partial and total failure)
// - static UI fallback

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use sheets_dashboard::ingest::providers::sheets_csv::{FixtureBody, SheetsCsvProvider};
use sheets_dashboard::ingest::types::SourceKey;
use sheets_dashboard::store::MemorySnapshotStore;
use sheets_dashboard::config::{AppConfig, StoreLocation};
use sheets_dashboard::{build_state, create_router, AppState};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn router_with(fetcher: SheetsCsvProvider) -> Router {
    let state = AppState::new(Arc::new(fetcher), Arc::new(MemorySnapshotStore::new()))
        .with_ui_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/ui"));
    create_router(state)
}

fn fixture_router() -> Router {
    router_with(SheetsCsvProvider::from_fixture_strs(
        include_str!("fixtures/simulador.csv"),
        include_str!("fixtures/indicacao.csv"),
    ))
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

async fn send_json(app: &Router, method: &str, uri: &str) -> (StatusCode, Json) {
    let (status, bytes) = send(app, method, uri).await;
    let v: Json = serde_json::from_slice(&bytes).expect("parse json");
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = fixture_router();
    let (status, bytes) = send(&app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK, "health should be 200");
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "OK");
}

#[tokio::test]
async fn dashboard_is_null_pair_before_first_refresh() {
    let app = fixture_router();
    let (status, v) = send_json(&app, "GET", "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert!(v["simulador"].is_null());
    assert!(v["indicacao"].is_null());
}

#[tokio::test]
async fn manual_refresh_populates_dashboard() {
    let app = fixture_router();

    let (status, report) = send_json(&app, "POST", "/api/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["errors"].as_array().map(Vec::len), Some(0));
    assert_eq!(report["simulador"]["totalLivesSold"], 16);

    let (_, v) = send_json(&app, "GET", "/api/dashboard").await;
    let sim = &v["simulador"];
    assert_eq!(sim["source"], "SIMULADOR");
    assert_eq!(sim["amountReceived"], 414.96);
    assert!(sim["lastUpdated"].as_i64().unwrap_or_default() > 0);
    assert_eq!(sim["display"]["amountReceived"], "R$ 414,96");
    assert_eq!(v["indicacao"]["display"]["monthlyAverage"], "R$ 1.543,21");
}

#[tokio::test]
async fn partial_failure_still_returns_200_with_error_list() {
    let mut bodies = HashMap::new();
    bodies.insert(SourceKey::Simulator, FixtureBody::Ok("Valor Recebido,,R$ 7,00".into()));
    bodies.insert(SourceKey::Referral, FixtureBody::Status("404 Not Found".into()));
    let app = router_with(SheetsCsvProvider::from_fixtures(bodies));

    let (status, report) = send_json(&app, "POST", "/api/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["simulador"]["amountReceived"], 7.0);
    assert!(report["indicacao"].is_null());
    assert_eq!(report["errors"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn total_failure_is_bad_gateway() {
    let app = router_with(SheetsCsvProvider::from_fixtures(HashMap::new()));
    let (status, report) = send_json(&app, "POST", "/api/refresh").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(report["errors"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn root_serves_dashboard_page() {
    let app = fixture_router();
    let (status, bytes) = send(&app, "GET", "/index.html").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(bytes).expect("utf8");
    assert!(html.contains("/api/refresh"));
    assert!(html.contains("id=\"comparativo\""), "source comparison chart");
}

#[tokio::test]
async fn build_state_with_memory_store_serves_empty_dashboard() {
    let cfg = AppConfig {
        store: StoreLocation::Memory,
        ..AppConfig::default()
    };
    let app = create_router(build_state(&cfg).await.expect("memory store"));
    let (status, v) = send_json(&app, "GET", "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert!(v["simulador"].is_null());
}
