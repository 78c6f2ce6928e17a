// src/config/app.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::ingest::config::{load_sources_default, SourceUrls};
use crate::ingest::scheduler::DEFAULT_REFRESH_INTERVAL_SECS;

pub const ENV_REFRESH_INTERVAL_SECS: &str = "REFRESH_INTERVAL_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_SNAPSHOT_STORE_PATH: &str = "SNAPSHOT_STORE_PATH";
pub const ENV_UI_DIR: &str = "UI_DIR";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_SNAPSHOT_STORE_PATH: &str = "state/snapshots.json";
pub const DEFAULT_UI_DIR: &str = "ui";
const MIN_REFRESH_INTERVAL_SECS: u64 = 10;

/// Where snapshots live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sources: SourceUrls,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub store: StoreLocation,
    pub ui_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: SourceUrls::default(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            store: StoreLocation::File(PathBuf::from(DEFAULT_SNAPSHOT_STORE_PATH)),
            ui_dir: PathBuf::from(DEFAULT_UI_DIR),
        }
    }
}

impl AppConfig {
    /// Build from environment (call `dotenvy::dotenv()` first if wanted).
    /// Malformed numbers fall back to defaults; a bad sources file is an error.
    pub fn from_env() -> anyhow::Result<Self> {
        let sources = load_sources_default()?;

        let refresh_secs = parse_secs_env(ENV_REFRESH_INTERVAL_SECS, DEFAULT_REFRESH_INTERVAL_SECS)
            .max(MIN_REFRESH_INTERVAL_SECS);
        let timeout_secs = parse_secs_env(ENV_FETCH_TIMEOUT_SECS, DEFAULT_FETCH_TIMEOUT_SECS);

        let store = match std::env::var(ENV_SNAPSHOT_STORE_PATH) {
            Ok(v) if v.trim().eq_ignore_ascii_case("memory") => StoreLocation::Memory,
            Ok(v) if !v.trim().is_empty() => StoreLocation::File(PathBuf::from(v.trim())),
            _ => StoreLocation::File(PathBuf::from(DEFAULT_SNAPSHOT_STORE_PATH)),
        };

        let ui_dir = std::env::var(ENV_UI_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_UI_DIR));

        Ok(Self {
            sources,
            refresh_interval: Duration::from_secs(refresh_secs),
            fetch_timeout: Duration::from_secs(timeout_secs.max(1)),
            store,
            ui_dir,
        })
    }
}

fn parse_secs_env(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(var = name, value = %raw, default, "invalid number, using default");
                default
            }
        },
        Err(_) => default,
    }
}
