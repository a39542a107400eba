//! Uniform read/write front over the configured backend.
//!
//! The adapter is the only component that touches the in-process fallback
//! store, and the only place backend failures are absorbed: callers of
//! `read`/`write` never see an error, only which storage method actually
//! answered. The tag distinguishes "fallback because the backend failed"
//! from "fallback because nothing was configured".

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::timeout;

use samshoblo_core::registration::Registration;
use samshoblo_core::storage::{
    RegistrationStore, Result, SaveOutcome, Snapshot, StorageError, StorageMethod,
};

use super::memory::MemoryStore;

pub struct StorageAdapter {
    primary: Option<Arc<dyn RegistrationStore>>,
    fallback: MemoryStore,
    /// Set when a backend was configured but could not be initialized at
    /// startup; reads then report `memory-fallback`, not `memory-only`.
    degraded: bool,
    op_timeout: Duration,
}

impl StorageAdapter {
    /// Adapter fronting a configured backend.
    pub fn with_primary(primary: Arc<dyn RegistrationStore>, op_timeout: Duration) -> Self {
        Self {
            primary: Some(primary),
            fallback: MemoryStore::new(),
            degraded: false,
            op_timeout,
        }
    }

    /// No backend configured: the fallback store is the store.
    pub fn memory_only(op_timeout: Duration) -> Self {
        Self {
            primary: None,
            fallback: MemoryStore::new(),
            degraded: false,
            op_timeout,
        }
    }

    /// A backend was configured but failed to initialize.
    pub fn degraded(op_timeout: Duration) -> Self {
        Self {
            primary: None,
            fallback: MemoryStore::new(),
            degraded: true,
            op_timeout,
        }
    }

    fn fallback_method(&self) -> StorageMethod {
        if self.degraded || self.primary.is_some() {
            StorageMethod::MemoryFallback
        } else {
            StorageMethod::MemoryOnly
        }
    }

    /// Loads the current registration set. Never fails: backend errors are
    /// logged and the fallback store's content is returned instead.
    pub async fn read(&self) -> (Snapshot, StorageMethod) {
        if let Some(store) = &self.primary {
            match timeout(self.op_timeout, store.load()).await {
                Ok(Ok(snapshot)) => {
                    return (snapshot, StorageMethod::for_backend(store.backend()));
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        backend = store.backend().as_str(),
                        error = %e,
                        "Backend read failed, serving fallback store"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        backend = store.backend().as_str(),
                        timeout_s = self.op_timeout.as_secs(),
                        "Backend read timed out, serving fallback store"
                    );
                }
            }
        }
        (self.fallback.snapshot().await, self.fallback_method())
    }

    /// Replaces the stored set. On backend failure the set is written to
    /// the fallback store and the call still reports success, tagged so the
    /// caller can warn about volatility.
    pub async fn write(&self, registrations: &[Registration]) -> (bool, StorageMethod) {
        if let Some(store) = &self.primary {
            match timeout(self.op_timeout, store.save(registrations)).await {
                Ok(Ok(())) => {
                    return (true, StorageMethod::for_backend(store.backend()));
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        backend = store.backend().as_str(),
                        error = %e,
                        "Backend write failed, writing to fallback store"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        backend = store.backend().as_str(),
                        timeout_s = self.op_timeout.as_secs(),
                        "Backend write timed out, writing to fallback store"
                    );
                }
            }
        }
        self.fallback.replace(registrations).await;
        (true, self.fallback_method())
    }

    /// Conditional variant of `write` for the repository's retry loop.
    /// Backend failure degrades to an unconditional fallback write rather
    /// than a conflict, since the fallback path has no concurrent writers
    /// to race against.
    pub async fn write_if_version(
        &self,
        registrations: &[Registration],
        expected: u64,
    ) -> (SaveOutcome, StorageMethod) {
        if let Some(store) = &self.primary {
            match timeout(self.op_timeout, store.save_if_version(registrations, expected)).await {
                Ok(Ok(outcome)) => {
                    return (outcome, StorageMethod::for_backend(store.backend()));
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        backend = store.backend().as_str(),
                        error = %e,
                        "Backend conditional write failed, writing to fallback store"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        backend = store.backend().as_str(),
                        timeout_s = self.op_timeout.as_secs(),
                        "Backend conditional write timed out, writing to fallback store"
                    );
                }
            }
        }
        self.fallback.replace(registrations).await;
        (SaveOutcome::Saved, self.fallback_method())
    }

    /// Records a keep-alive heartbeat on the active store. Unlike the data
    /// paths this propagates errors: a heartbeat that silently lands in the
    /// fallback store would defeat its purpose of keeping the real backend
    /// awake.
    pub async fn heartbeat(&self, now: DateTime<Utc>) -> Result<u64> {
        match &self.primary {
            Some(store) => timeout(self.op_timeout, store.heartbeat(now))
                .await
                .map_err(|_| StorageError::Timeout(self.op_timeout.as_secs()))?,
            None => Ok(self.fallback.record_heartbeat(now).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use samshoblo_core::registration::{NewRegistration, Registration};
    use samshoblo_core::storage::Backend;

    /// Store double whose every operation fails.
    struct FailingStore;

    #[async_trait]
    impl RegistrationStore for FailingStore {
        fn backend(&self) -> Backend {
            Backend::Redis
        }

        async fn load(&self) -> Result<Snapshot> {
            Err(StorageError::ConnectionFailed("refused".to_string()))
        }

        async fn save(&self, _registrations: &[Registration]) -> Result<()> {
            Err(StorageError::ConnectionFailed("refused".to_string()))
        }

        async fn heartbeat(&self, _now: DateTime<Utc>) -> Result<u64> {
            Err(StorageError::ConnectionFailed("refused".to_string()))
        }
    }

    fn registration() -> Registration {
        Registration::from_submission(NewRegistration {
            child_name: "Mariam".to_string(),
            child_surname: "Giorgadze".to_string(),
            child_age: "12".to_string(),
            parent_name: "Nino".to_string(),
            parent_surname: "Giorgadze".to_string(),
            parent_phone: "+995599123456".to_string(),
        })
    }

    #[tokio::test]
    async fn test_memory_only_reads_report_memory_only() {
        let adapter = StorageAdapter::memory_only(Duration::from_secs(1));
        let (snapshot, method) = adapter.read().await;

        assert!(snapshot.registrations.is_empty());
        assert_eq!(method, StorageMethod::MemoryOnly);
    }

    #[tokio::test]
    async fn test_failed_backend_degrades_to_fallback() {
        let adapter =
            StorageAdapter::with_primary(Arc::new(FailingStore), Duration::from_secs(1));

        let (ok, method) = adapter.write(&[registration()]).await;
        assert!(ok);
        assert_eq!(method, StorageMethod::MemoryFallback);

        // The fallback kept the write; the tag says so.
        let (snapshot, method) = adapter.read().await;
        assert_eq!(snapshot.registrations.len(), 1);
        assert_eq!(method, StorageMethod::MemoryFallback);
    }

    #[tokio::test]
    async fn test_degraded_adapter_is_tagged_fallback_not_memory_only() {
        let adapter = StorageAdapter::degraded(Duration::from_secs(1));
        let (_, method) = adapter.read().await;
        assert_eq!(method, StorageMethod::MemoryFallback);
    }

    #[tokio::test]
    async fn test_working_backend_reports_its_own_method() {
        let store = Arc::new(MemoryStore::new());
        let adapter = StorageAdapter::with_primary(store, Duration::from_secs(1));

        let (_, method) = adapter.write(&[registration()]).await;
        assert_eq!(method, StorageMethod::MemoryOnly);
    }

    #[tokio::test]
    async fn test_heartbeat_error_propagates() {
        let adapter =
            StorageAdapter::with_primary(Arc::new(FailingStore), Duration::from_secs(1));
        assert!(adapter.heartbeat(Utc::now()).await.is_err());
    }
}
