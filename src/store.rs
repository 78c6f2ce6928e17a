//! store.rs — latest snapshot per source (upsert by key) and the dashboard read.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{fs, sync::Mutex};

use crate::extract::ExtractedMetrics;
use crate::ingest::types::SourceKey;

/// Latest metrics stored for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub source: SourceKey,
    pub metrics: ExtractedMetrics,
    pub last_updated: DateTime<Utc>,
}

/// Both known sources as the dashboard reads them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub simulator: Option<Snapshot>,
    pub referral: Option<Snapshot>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot store encoding: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("snapshot store lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Overwrite the snapshot for `source` (or insert it), stamped with now.
    async fn upsert(
        &self,
        source: SourceKey,
        metrics: ExtractedMetrics,
    ) -> Result<Snapshot, StoreError>;

    async fn get(&self, source: SourceKey) -> Result<Option<Snapshot>, StoreError>;
}

pub async fn read_dashboard(store: &dyn SnapshotStore) -> Result<DashboardData, StoreError> {
    Ok(DashboardData {
        simulator: store.get(SourceKey::Simulator).await?,
        referral: store.get(SourceKey::Referral).await?,
    })
}

fn stamp(source: SourceKey, metrics: ExtractedMetrics) -> Snapshot {
    Snapshot {
        source,
        metrics,
        last_updated: Utc::now(),
    }
}

/// Process-local store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    inner: RwLock<HashMap<SourceKey, Snapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn upsert(
        &self,
        source: SourceKey,
        metrics: ExtractedMetrics,
    ) -> Result<Snapshot, StoreError> {
        let snap = stamp(source, metrics);
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        map.insert(source, snap.clone());
        Ok(snap)
    }

    async fn get(&self, source: SourceKey) -> Result<Option<Snapshot>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(&source).cloned())
    }
}

/// JSON-file store. Writes are serialized and land via temp file + rename,
/// so a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
    inner: Mutex<HashMap<SourceKey, Snapshot>>,
}

impl FileSnapshotStore {
    /// Open (or lazily create) the store at `path`. A missing file starts
    /// empty, as does a corrupt one (with a warning). Any other read error is
    /// returned so the first upsert cannot overwrite snapshots it never loaded.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let rows: Vec<Snapshot> = match fs::read_to_string(&path).await {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "snapshot file corrupt, starting empty: {e:#}");
                Vec::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "snapshot file unreadable");
                return Err(e.into());
            }
        };
        let map = rows.into_iter().map(|s| (s.source, s)).collect();
        Ok(Self {
            path,
            inner: Mutex::new(map),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, map: &HashMap<SourceKey, Snapshot>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }
        let mut rows: Vec<&Snapshot> = map.values().collect();
        rows.sort_by_key(|s| s.source);
        let bytes = serde_json::to_vec_pretty(&rows)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn upsert(
        &self,
        source: SourceKey,
        metrics: ExtractedMetrics,
    ) -> Result<Snapshot, StoreError> {
        let mut map = self.inner.lock().await;
        let snap = stamp(source, metrics);
        let previous = map.insert(source, snap.clone());
        if let Err(e) = self.persist(&map).await {
            // keep memory consistent with disk
            match previous {
                Some(p) => map.insert(source, p),
                None => map.remove(&source),
            };
            return Err(e);
        }
        Ok(snap)
    }

    async fn get(&self, source: SourceKey) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.inner.lock().await.get(&source).cloned())
    }
}
