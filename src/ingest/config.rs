// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::SourceKey;

pub const ENV_SOURCES_PATH: &str = "SHEETS_SOURCES_PATH";

const DEFAULT_SIMULATOR_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRstUJbWWZxp2yzQqoLZ9gFxL0hl289HwTd9jrRLxju7vyLp56-eTXn3Ja_DMW1MQ/pub?gid=1537840544&single=true&output=csv";
const DEFAULT_REFERRAL_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRstUJbWWZxp2yzQqoLZ9gFxL0hl289HwTd9jrRLxju7vyLp56-eTXn3Ja_DMW1MQ/pub?gid=1032190707&single=true&output=csv";

fn default_simulator_url() -> String {
    DEFAULT_SIMULATOR_URL.to_string()
}
fn default_referral_url() -> String {
    DEFAULT_REFERRAL_URL.to_string()
}

/// CSV export URL per source. Keys missing from a config file keep the
/// built-in published URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUrls {
    #[serde(rename = "SIMULADOR", default = "default_simulator_url")]
    pub simulator: String,
    #[serde(rename = "INDICACAO", default = "default_referral_url")]
    pub referral: String,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            simulator: default_simulator_url(),
            referral: default_referral_url(),
        }
    }
}

impl SourceUrls {
    pub fn url_for(&self, key: SourceKey) -> &str {
        match key {
            SourceKey::Simulator => &self.simulator,
            SourceKey::Referral => &self.referral,
        }
    }
}

/// Load source URLs from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<SourceUrls> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load source URLs using env var + fallbacks:
/// 1) $SHEETS_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in published URLs
pub fn load_sources_default() -> Result<SourceUrls> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("SHEETS_SOURCES_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(SourceUrls::default())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<SourceUrls> {
    let parsed = if hint_ext == "json" || s.trim_start().starts_with('{') {
        parse_json(s)
    } else {
        parse_toml(s)
    }?;
    validate(parsed)
}

fn parse_toml(s: &str) -> Result<SourceUrls> {
    Ok(toml::from_str(s)?)
}

fn parse_json(s: &str) -> Result<SourceUrls> {
    Ok(serde_json::from_str(s)?)
}

fn validate(mut urls: SourceUrls) -> Result<SourceUrls> {
    for key in SourceKey::ALL {
        let url = urls.url_for(key).trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!("source {key} has a non-http url: '{url}'"));
        }
    }
    urls.simulator = urls.simulator.trim().to_string();
    urls.referral = urls.referral.trim().to_string();
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_and_json_formats_work() {
        let toml = r#"
SIMULADOR = " https://example.com/sim.csv "
INDICACAO = "https://example.com/ind.csv"
"#;
        let t = parse_sources(toml, "toml").unwrap();
        assert_eq!(t.simulator, "https://example.com/sim.csv");
        assert_eq!(t.url_for(SourceKey::Referral), "https://example.com/ind.csv");

        let json = r#"{"INDICACAO": "http://localhost:9/ind.csv"}"#;
        let j = parse_sources(json, "").unwrap();
        assert_eq!(j.referral, "http://localhost:9/ind.csv");
        assert_eq!(j.simulator, DEFAULT_SIMULATOR_URL);
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = parse_sources(r#"SIMULADOR = "file:///etc/passwd""#, "toml").unwrap_err();
        assert!(err.to_string().contains("SIMULADOR"));
    }
}
