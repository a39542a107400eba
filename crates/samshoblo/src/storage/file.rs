//! Flat-file registration store.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use samshoblo_core::registration::Registration;
use samshoblo_core::storage::{
    Backend, RegistrationStore, Result, Snapshot, StorageError, HEARTBEAT_RETENTION_HOURS,
};

/// Stores the full registration set as one JSON file.
///
/// Every load re-reads and re-parses the file; every save rewrites it
/// through a temp-file rename so a crash mid-write never leaves a
/// truncated set behind. Heartbeats are liveness bookkeeping only and stay
/// in process memory rather than in the data file.
pub struct FileStore {
    path: PathBuf,
    heartbeats: Arc<RwLock<Vec<DateTime<Utc>>>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            heartbeats: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

#[async_trait]
impl RegistrationStore for FileStore {
    fn backend(&self) -> Backend {
        Backend::File
    }

    async fn load(&self) -> Result<Snapshot> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            // A missing file is an empty store, not an error.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Snapshot::default()),
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };

        let registrations: Vec<Registration> = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        Ok(Snapshot {
            registrations,
            version: 0,
        })
    }

    async fn save(&self, registrations: &[Registration]) -> Result<()> {
        let bytes = serde_json::to_vec(registrations)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(())
    }

    async fn heartbeat(&self, now: DateTime<Utc>) -> Result<u64> {
        let cutoff = now - Duration::hours(HEARTBEAT_RETENTION_HOURS);
        let mut heartbeats = self.heartbeats.write().await;
        let before = heartbeats.len();
        heartbeats.retain(|t| *t >= cutoff);
        let pruned = before - heartbeats.len();
        heartbeats.push(now);
        Ok(pruned as u64)
    }
}
