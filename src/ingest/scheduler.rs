// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ingest::types::SheetFetcher;
use crate::store::SnapshotStore;

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

#[derive(Clone, Copy, Debug)]
pub struct RefreshSchedulerCfg {
    pub interval: Duration,
}

impl Default for RefreshSchedulerCfg {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
        }
    }
}

/// Spawn the periodic refresh-all job. The first tick fires immediately so
/// the dashboard has data right after boot.
pub fn spawn_refresh_scheduler(
    cfg: RefreshSchedulerCfg,
    fetcher: Arc<dyn SheetFetcher>,
    store: Arc<dyn SnapshotStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cfg.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;

            let report = crate::ingest::refresh_all(fetcher.as_ref(), store.as_ref()).await;

            tracing::info!(
                target: "ingest",
                simulador_ok = report.simulator.is_some(),
                indicacao_ok = report.referral.is_some(),
                errors = report.errors.len(),
                "scheduled refresh tick"
            );
        }
    })
}
