// src/ingest/types.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which published spreadsheet a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceKey {
    #[serde(rename = "SIMULADOR")]
    Simulator,
    #[serde(rename = "INDICACAO")]
    Referral,
}

impl SourceKey {
    pub const ALL: [SourceKey; 2] = [SourceKey::Simulator, SourceKey::Referral];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKey::Simulator => "SIMULADOR",
            SourceKey::Referral => "INDICACAO",
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKey {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SIMULADOR" => Ok(SourceKey::Simulator),
            "INDICACAO" => Ok(SourceKey::Referral),
            other => Err(FetchError::UnknownSource(other.to_string())),
        }
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote document could not be reached at all.
    #[error("transport error fetching {key}: {inner}")]
    Transport {
        key: SourceKey,
        #[source]
        inner: BoxError,
    },
    /// The remote answered with a non-success status.
    #[error("failed to fetch data for {key}: {status}")]
    RemoteFetch { key: SourceKey, status: String },
    #[error("invalid source: {0}")]
    UnknownSource(String),
}

impl FetchError {
    pub fn transport(key: SourceKey, inner: impl Into<BoxError>) -> Self {
        FetchError::Transport {
            key,
            inner: inner.into(),
        }
    }
}

/// Retrieves the raw CSV text of one source.
#[async_trait::async_trait]
pub trait SheetFetcher: Send + Sync {
    async fn fetch(&self, key: SourceKey) -> Result<String, FetchError>;
    fn name(&self) -> &'static str;
}
