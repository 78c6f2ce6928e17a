// tests/fetch_http.rs
//
// The HTTP provider against a throwaway local server: success body is
// passed through untouched, non-2xx maps to RemoteFetch, an unreachable
// host maps to Transport.

use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use sheets_dashboard::ingest::config::SourceUrls;
use sheets_dashboard::ingest::providers::sheets_csv::SheetsCsvProvider;
use sheets_dashboard::ingest::types::{FetchError, SheetFetcher, SourceKey};

const CSV: &str = "\"Vidas Totais vendidas\",,16\r\n\"Valor Recebido\",,\"R$ 414,96\"\r\n";

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/sim.csv", get(|| async { CSV }))
        .route(
            "/ind.csv",
            get(|| async { (StatusCode::NOT_FOUND, "gone") }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn success_body_is_returned_unmodified() {
    let base = spawn_server().await;
    let urls = SourceUrls {
        simulator: format!("{base}/sim.csv"),
        referral: format!("{base}/ind.csv"),
    };
    let p = SheetsCsvProvider::from_urls(urls, Duration::from_secs(5));

    let body = p.fetch(SourceKey::Simulator).await.expect("fetch ok");
    assert_eq!(body, CSV);
    assert_eq!(p.name(), "sheets-http");
}

#[tokio::test]
async fn non_success_status_is_remote_fetch_error() {
    let base = spawn_server().await;
    let urls = SourceUrls {
        simulator: format!("{base}/sim.csv"),
        referral: format!("{base}/ind.csv"),
    };
    let p = SheetsCsvProvider::from_urls(urls, Duration::from_secs(5));

    match p.fetch(SourceKey::Referral).await {
        Err(FetchError::RemoteFetch { key, status }) => {
            assert_eq!(key, SourceKey::Referral);
            assert!(status.contains("404"), "status text: {status}");
        }
        other => panic!("expected RemoteFetch, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let urls = SourceUrls {
        simulator: format!("http://{addr}/sim.csv"),
        referral: format!("http://{addr}/ind.csv"),
    };
    let p = SheetsCsvProvider::from_urls(urls, Duration::from_secs(2));

    let err = p.fetch(SourceKey::Simulator).await.unwrap_err();
    assert!(
        matches!(err, FetchError::Transport { key: SourceKey::Simulator, .. }),
        "got {err:?}"
    );
}
