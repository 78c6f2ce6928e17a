use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::extract::ExtractedMetrics;
use crate::format::{format_currency, format_integer, format_timestamp};
use crate::ingest::types::{SheetFetcher, SourceKey};
use crate::ingest::{refresh_all, RefreshReport};
use crate::store::{read_dashboard, Snapshot, SnapshotStore};

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn SheetFetcher>,
    pub store: Arc<dyn SnapshotStore>,
    pub ui_dir: PathBuf,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn SheetFetcher>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            fetcher,
            store,
            ui_dir: PathBuf::from(crate::config::app::DEFAULT_UI_DIR),
        }
    }

    pub fn with_ui_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ui_dir = dir.into();
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let ui = ServeDir::new(&state.ui_dir);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/dashboard", get(dashboard))
        .route("/api/refresh", post(manual_refresh))
        .fallback_service(ui)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DisplayView {
    total_lives_sold: String,
    amount_received: String,
    monthly_average: String,
    last_updated: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotView {
    source: SourceKey,
    #[serde(flatten)]
    metrics: ExtractedMetrics,
    /// epoch milliseconds
    last_updated: i64,
    display: DisplayView,
}

impl From<Snapshot> for SnapshotView {
    fn from(s: Snapshot) -> Self {
        let m = s.metrics;
        Self {
            source: s.source,
            metrics: m,
            last_updated: s.last_updated.timestamp_millis(),
            display: DisplayView {
                total_lives_sold: format_integer(m.total_lives_sold),
                amount_received: format_currency(m.amount_received),
                monthly_average: format_currency(m.monthly_average),
                last_updated: format_timestamp(s.last_updated),
            },
        }
    }
}

#[derive(Serialize)]
struct DashboardOut {
    simulador: Option<SnapshotView>,
    indicacao: Option<SnapshotView>,
}

async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardOut>, (StatusCode, String)> {
    let data = read_dashboard(state.store.as_ref()).await.map_err(|e| {
        tracing::warn!(error = %e, "dashboard read failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(DashboardOut {
        simulador: data.simulator.map(SnapshotView::from),
        indicacao: data.referral.map(SnapshotView::from),
    }))
}

/// Same effect as a scheduler tick. 502 only when every source failed.
async fn manual_refresh(State(state): State<AppState>) -> (StatusCode, Json<RefreshReport>) {
    let report = refresh_all(state.fetcher.as_ref(), state.store.as_ref()).await;
    let status = if report.any_succeeded() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    tracing::info!(%status, errors = report.errors.len(), "manual refresh");
    (status, Json(report))
}
