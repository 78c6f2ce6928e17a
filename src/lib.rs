// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod extract;
pub mod format;
pub mod ingest;
pub mod metrics;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::extract::{extract, ExtractedMetrics};
pub use crate::ingest::{refresh_all, RefreshReport};

use std::sync::Arc;

use anyhow::Context as _;

use crate::config::{AppConfig, StoreLocation};
use crate::ingest::providers::sheets_csv::SheetsCsvProvider;
use crate::store::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default `RUST_LOG` directives. Fetch, refresh and scheduler events log under
/// the `ingest` target, which needs its own directive.
pub const DEFAULT_LOG_FILTER: &str = "sheets_dashboard=info,ingest=info,warn";

/// `RUST_LOG` when set and valid, otherwise [`DEFAULT_LOG_FILTER`].
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Wire the HTTP fetcher and the configured snapshot store into an `AppState`.
/// Fails when an existing snapshot file cannot be read.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let fetcher = Arc::new(SheetsCsvProvider::from_urls(
        cfg.sources.clone(),
        cfg.fetch_timeout,
    ));

    let store: Arc<dyn SnapshotStore> = match &cfg.store {
        StoreLocation::Memory => Arc::new(MemorySnapshotStore::new()),
        StoreLocation::File(path) => Arc::new(
            FileSnapshotStore::open(path)
                .await
                .with_context(|| format!("open snapshot store {}", path.display()))?,
        ),
    };

    info!(
        store = ?cfg.store,
        interval_secs = cfg.refresh_interval.as_secs(),
        ui_dir = %cfg.ui_dir.display(),
        "app state ready"
    );

    Ok(AppState::new(fetcher, store).with_ui_dir(cfg.ui_dir.clone()))
}
