//! Sheets Dashboard — Binary Entrypoint
//! Boots the Axum HTTP server, the periodic refresh job, and the `/metrics` exporter.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*};

use sheets_dashboard::config::AppConfig;
use sheets_dashboard::ingest::scheduler::{spawn_refresh_scheduler, RefreshSchedulerCfg};
use sheets_dashboard::metrics::Metrics;

/// Compact tracing logs; `RUST_LOG` overrides the default filter.
/// A second init (e.g. a runtime that already installed a subscriber) is a no-op.
fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(sheets_dashboard::log_filter())
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::from_env()?;
    let state = sheets_dashboard::build_state(&cfg).await?;

    spawn_refresh_scheduler(
        RefreshSchedulerCfg {
            interval: cfg.refresh_interval,
        },
        state.fetcher.clone(),
        state.store.clone(),
    );

    let mut router = sheets_dashboard::create_router(state);
    match Metrics::init(cfg.refresh_interval.as_secs()) {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = %e, "metrics exporter disabled"),
    }

    Ok(router.into())
}
