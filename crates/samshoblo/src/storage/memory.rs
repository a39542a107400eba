//! In-memory registration store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use samshoblo_core::registration::Registration;
use samshoblo_core::storage::{
    Backend, RegistrationStore, Result, Snapshot, HEARTBEAT_RETENTION_HOURS,
};

/// Process-wide in-memory store.
///
/// Serves two roles: the backend when nothing persistent is configured, and
/// the fallback store the adapter degrades to when the configured backend
/// fails. Data is lost on process restart. Reads hand out clones, so
/// callers can never corrupt the owned sequence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    registrations: Arc<RwLock<Vec<Registration>>>,
    heartbeats: Arc<RwLock<Vec<DateTime<Utc>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Infallible snapshot of the current set, used directly by the adapter
    /// on its fallback path.
    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            registrations: self.registrations.read().await.clone(),
            version: 0,
        }
    }

    /// Infallible whole-set replacement, used directly by the adapter.
    pub async fn replace(&self, registrations: &[Registration]) {
        *self.registrations.write().await = registrations.to_vec();
    }

    /// Records a heartbeat and prunes entries past the retention window.
    pub async fn record_heartbeat(&self, now: DateTime<Utc>) -> u64 {
        let cutoff = now - Duration::hours(HEARTBEAT_RETENTION_HOURS);
        let mut heartbeats = self.heartbeats.write().await;
        let before = heartbeats.len();
        heartbeats.retain(|t| *t >= cutoff);
        let pruned = before - heartbeats.len();
        heartbeats.push(now);
        pruned as u64
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    fn backend(&self) -> Backend {
        Backend::Memory
    }

    async fn load(&self) -> Result<Snapshot> {
        Ok(self.snapshot().await)
    }

    async fn save(&self, registrations: &[Registration]) -> Result<()> {
        self.replace(registrations).await;
        Ok(())
    }

    async fn heartbeat(&self, now: DateTime<Utc>) -> Result<u64> {
        Ok(self.record_heartbeat(now).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use samshoblo_core::registration::NewRegistration;

    fn registration(child: &str) -> Registration {
        Registration::from_submission(NewRegistration {
            child_name: child.to_string(),
            child_surname: "Giorgadze".to_string(),
            child_age: "9".to_string(),
            parent_name: "Nino".to_string(),
            parent_surname: "Giorgadze".to_string(),
            parent_phone: "+995599123456".to_string(),
        })
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let store = MemoryStore::new();
        let snapshot = store.load().await.unwrap();
        assert!(snapshot.registrations.is_empty());
        assert_eq!(snapshot.version, 0);
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrips() {
        let store = MemoryStore::new();
        let set = vec![registration("Mariam"), registration("Giorgi")];

        store.save(&set).await.unwrap();
        let snapshot = store.load().await.unwrap();

        assert_eq!(snapshot.registrations, set);
    }

    #[tokio::test]
    async fn test_load_returns_a_defensive_copy() {
        let store = MemoryStore::new();
        store.save(&[registration("Mariam")]).await.unwrap();

        let mut snapshot = store.load().await.unwrap();
        snapshot.registrations.clear();

        assert_eq!(store.load().await.unwrap().registrations.len(), 1);
    }

    #[tokio::test]
    async fn test_heartbeat_prunes_stale_entries() {
        let store = MemoryStore::new();
        let old = Utc::now() - Duration::hours(48);
        let recent = Utc::now() - Duration::hours(1);

        assert_eq!(store.heartbeat(old).await.unwrap(), 0);
        assert_eq!(store.heartbeat(recent).await.unwrap(), 1);
        assert_eq!(store.heartbeat(Utc::now()).await.unwrap(), 0);
    }
}
