// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::extract::{extract_with_report, ExtractedMetrics};
use crate::ingest::types::{FetchError, SheetFetcher, SourceKey};
use crate::store::{SnapshotStore, StoreError};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;
use thiserror::Error;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("refresh_runs_total", "Refresh-all runs (scheduled + manual).");
        describe_counter!(
            "refresh_source_errors_total",
            "Per-source fetch/store failures."
        );
        describe_counter!(
            "extract_lines_scanned_total",
            "CSV lines scanned by the metric extractor."
        );
        describe_counter!(
            "extract_missing_labels_total",
            "Metric labels not found in a fetched document."
        );
        describe_counter!("fetch_transport_errors_total", "Network-level fetch failures.");
        describe_counter!("fetch_status_errors_total", "Non-2xx fetch responses.");
        describe_histogram!("fetch_duration_ms", "Sheet fetch time in milliseconds.");
        describe_gauge!("refresh_last_run_ts", "Unix ts when refresh-all last ran.");
    });
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to store snapshot for {key}: {inner}")]
    Store {
        key: SourceKey,
        #[source]
        inner: StoreError,
    },
}

/// Outcome of `refresh_all`. A source that failed is `None` and contributes
/// one message to `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    #[serde(rename = "simulador")]
    pub simulator: Option<ExtractedMetrics>,
    #[serde(rename = "indicacao")]
    pub referral: Option<ExtractedMetrics>,
    pub errors: Vec<String>,
}

impl RefreshReport {
    pub fn any_succeeded(&self) -> bool {
        self.simulator.is_some() || self.referral.is_some()
    }

    fn record(&mut self, key: SourceKey, outcome: Result<ExtractedMetrics, RefreshError>) {
        match outcome {
            Ok(m) => match key {
                SourceKey::Simulator => self.simulator = Some(m),
                SourceKey::Referral => self.referral = Some(m),
            },
            Err(e) => self.errors.push(e.to_string()),
        }
    }
}

/// Fetch one source, extract its metrics and upsert the snapshot.
pub async fn refresh_source(
    fetcher: &dyn SheetFetcher,
    store: &dyn SnapshotStore,
    key: SourceKey,
) -> Result<ExtractedMetrics, RefreshError> {
    ensure_metrics_described();

    let body = fetcher.fetch(key).await?;
    let (metrics, report) = extract_with_report(&body);

    counter!("extract_lines_scanned_total").increment(report.lines_scanned as u64);
    let missing = report.missing_labels();
    if !missing.is_empty() {
        counter!("extract_missing_labels_total").increment(missing.len() as u64);
        tracing::debug!(target: "ingest", source = %key, ?missing, "labels not found, defaulting to zero");
    }

    store
        .upsert(key, metrics)
        .await
        .map_err(|inner| RefreshError::Store { key, inner })?;

    tracing::info!(
        target: "ingest",
        source = %key,
        provider = fetcher.name(),
        bytes = body.len(),
        lines = report.lines_scanned,
        empty_captures = report.empty_captures,
        total_lives_sold = metrics.total_lives_sold,
        amount_received = metrics.amount_received,
        monthly_average = metrics.monthly_average,
        "snapshot updated"
    );
    Ok(metrics)
}

/// Refresh both sources concurrently. Each source fails independently;
/// this never returns an error itself.
pub async fn refresh_all(fetcher: &dyn SheetFetcher, store: &dyn SnapshotStore) -> RefreshReport {
    ensure_metrics_described();

    let (sim, ind) = tokio::join!(
        refresh_source(fetcher, store, SourceKey::Simulator),
        refresh_source(fetcher, store, SourceKey::Referral),
    );

    let mut report = RefreshReport::default();
    for (key, outcome) in [(SourceKey::Simulator, sim), (SourceKey::Referral, ind)] {
        if let Err(e) = &outcome {
            tracing::warn!(target: "ingest", error = %e, source = %key, "source refresh failed");
            counter!("refresh_source_errors_total").increment(1);
        }
        report.record(key, outcome);
    }

    let now = chrono::Utc::now().timestamp().max(0) as u64;
    counter!("refresh_runs_total").increment(1);
    gauge!("refresh_last_run_ts").set(now as f64);

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::providers::sheets_csv::{FixtureBody, SheetsCsvProvider};
    use crate::store::MemorySnapshotStore;
    use std::collections::HashMap;

    #[tokio::test]
    async fn one_failing_source_does_not_block_the_other() {
        let mut bodies = HashMap::new();
        bodies.insert(
            SourceKey::Simulator,
            FixtureBody::Ok("Vidas Totais vendidas,,4".into()),
        );
        bodies.insert(
            SourceKey::Referral,
            FixtureBody::Status("500 Internal Server Error".into()),
        );
        let fetcher = SheetsCsvProvider::from_fixtures(bodies);
        let store = MemorySnapshotStore::new();

        let report = refresh_all(&fetcher, &store).await;
        assert_eq!(report.simulator.map(|m| m.total_lives_sold), Some(4));
        assert!(report.referral.is_none());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("INDICACAO"), "{:?}", report.errors);
        assert!(report.any_succeeded());
        assert!(store.get(SourceKey::Referral).await.unwrap().is_none());
    }

    #[test]
    fn report_serializes_with_source_wire_names() {
        let report = RefreshReport {
            simulator: Some(ExtractedMetrics::default()),
            referral: None,
            errors: vec!["x".into()],
        };
        let v = serde_json::to_value(&report).unwrap();
        assert!(v["simulador"].is_object());
        assert!(v["indicacao"].is_null());
        assert_eq!(v["errors"][0], "x");
    }
}
