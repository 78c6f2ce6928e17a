// src/ingest/providers/sheets_csv.rs
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::ingest::config::SourceUrls;
use crate::ingest::types::{FetchError, SheetFetcher, SourceKey};

/// Published-spreadsheet CSV provider.
pub struct SheetsCsvProvider {
    mode: Mode,
}

/// Canned outcome for a fixture source.
#[derive(Debug, Clone)]
pub enum FixtureBody {
    Ok(String),
    /// Behaves like a non-2xx response with this status text.
    Status(String),
    /// Behaves like a network failure with this message.
    Unreachable(String),
}

enum Mode {
    Fixture(HashMap<SourceKey, FixtureBody>),
    Http {
        urls: SourceUrls,
        client: Client,
        timeout: Duration,
    },
}

impl SheetsCsvProvider {
    pub fn from_urls(urls: SourceUrls, timeout: Duration) -> Self {
        Self {
            mode: Mode::Http {
                urls,
                client: Client::new(),
                timeout,
            },
        }
    }

    /// Sources absent from `bodies` fail as unknown.
    pub fn from_fixtures(bodies: HashMap<SourceKey, FixtureBody>) -> Self {
        Self {
            mode: Mode::Fixture(bodies),
        }
    }

    /// Convenience: both sources answer with the given CSV text.
    pub fn from_fixture_strs(simulator: &str, referral: &str) -> Self {
        let mut bodies = HashMap::new();
        bodies.insert(SourceKey::Simulator, FixtureBody::Ok(simulator.to_string()));
        bodies.insert(SourceKey::Referral, FixtureBody::Ok(referral.to_string()));
        Self::from_fixtures(bodies)
    }

    async fn fetch_http(
        client: &Client,
        url: &str,
        timeout: Duration,
        key: SourceKey,
    ) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let resp = match client.get(url).timeout(timeout).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = ?e, source = %key, "sheet http error");
                counter!("fetch_transport_errors_total").increment(1);
                return Err(FetchError::transport(key, e));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            counter!("fetch_status_errors_total").increment(1);
            return Err(FetchError::RemoteFetch {
                key,
                status: status.to_string(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::transport(key, e))?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("fetch_duration_ms").record(ms);
        tracing::debug!(target: "ingest", source = %key, bytes = body.len(), ms, "sheet fetched");
        Ok(body)
    }
}

#[async_trait]
impl SheetFetcher for SheetsCsvProvider {
    async fn fetch(&self, key: SourceKey) -> Result<String, FetchError> {
        match &self.mode {
            Mode::Fixture(bodies) => match bodies.get(&key) {
                Some(FixtureBody::Ok(body)) => Ok(body.clone()),
                Some(FixtureBody::Status(status)) => Err(FetchError::RemoteFetch {
                    key,
                    status: status.clone(),
                }),
                Some(FixtureBody::Unreachable(msg)) => {
                    Err(FetchError::transport(key, msg.clone()))
                }
                None => Err(FetchError::UnknownSource(key.to_string())),
            },
            Mode::Http {
                urls,
                client,
                timeout,
            } => Self::fetch_http(client, urls.url_for(key), *timeout, key).await,
        }
    }

    fn name(&self) -> &'static str {
        match self.mode {
            Mode::Fixture(_) => "sheets-fixture",
            Mode::Http { .. } => "sheets-http",
        }
    }
}
