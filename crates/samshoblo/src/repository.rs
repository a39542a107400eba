//! Business-level registration operations on top of the storage adapter:
//! duplicate-safe append, capacity-bounded FIFO eviction, newest-first
//! listing, and on-demand statistics.

use std::time::Duration;

use serde::Serialize;

use samshoblo_core::registration::{
    evict_oldest, is_duplicate, serialized_size_mb, sort_newest_first, NewRegistration,
    Registration,
};
use samshoblo_core::storage::{Result, SaveOutcome, StorageMethod};

use crate::storage::StorageAdapter;

/// Attempts at the conditional-save loop before accepting the race window
/// of a plain read-modify-write.
const SAVE_ATTEMPTS: usize = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Storage quota advertised to the admin dashboard, matching the hosted
/// database's free tier.
const STORAGE_LIMIT_MB: f64 = 500.0;

/// Outcome of an add: a duplicate is a distinguished success, never an
/// error, so the client can render a non-error message.
#[derive(Debug, Clone)]
pub struct AddResult {
    pub success: bool,
    pub registration: Registration,
    pub method: StorageMethod,
    pub is_duplicate: bool,
    pub removed_count: usize,
    pub total_count: usize,
}

/// Derived storage statistics, computed from a fresh read and never cached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub total_registrations: usize,
    pub max_capacity: usize,
    /// Serialized size of the full set in MB, two-decimal rounded.
    pub storage_used: f64,
    pub storage_method: StorageMethod,
    // camelCase would lowercase the MB suffix; the clients expect it capitalized.
    #[serde(rename = "estimatedStorageRemainingMB")]
    pub estimated_storage_remaining_mb: f64,
    #[serde(rename = "storageLimitMB")]
    pub storage_limit_mb: f64,
}

pub struct RegistrationRepository {
    adapter: StorageAdapter,
    capacity: usize,
}

impl RegistrationRepository {
    pub fn new(adapter: StorageAdapter, capacity: usize) -> Self {
        Self { adapter, capacity }
    }

    /// Appends a submission unless its (phone, child name, child surname)
    /// tuple already exists, evicting the oldest entries past capacity.
    ///
    /// Backends with conditional writes get a bounded retry when the
    /// persist races a concurrent writer; after `SAVE_ATTEMPTS` conflicts
    /// the add proceeds with a plain read-modify-write rather than failing
    /// the request outright.
    pub async fn add(&self, submission: NewRegistration) -> AddResult {
        let registration = Registration::from_submission(submission);

        for attempt in 1..=SAVE_ATTEMPTS {
            let (snapshot, method) = self.adapter.read().await;

            if is_duplicate(&snapshot.registrations, &registration) {
                return AddResult {
                    success: true,
                    total_count: snapshot.registrations.len(),
                    registration,
                    method,
                    is_duplicate: true,
                    removed_count: 0,
                };
            }

            let mut next = snapshot.registrations;
            next.push(registration.clone());
            let removed_count = evict_oldest(&mut next, self.capacity);

            match self.adapter.write_if_version(&next, snapshot.version).await {
                (SaveOutcome::Saved, method) => {
                    tracing::info!(
                        id = %registration.id,
                        total = next.len(),
                        removed = removed_count,
                        storage = method.as_str(),
                        "Stored registration"
                    );
                    return AddResult {
                        success: true,
                        total_count: next.len(),
                        registration,
                        method,
                        is_duplicate: false,
                        removed_count,
                    };
                }
                (SaveOutcome::Conflict, _) => {
                    tracing::debug!(attempt, "Conditional save lost a race, retrying");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
            }
        }

        // Retries exhausted: accept the small race window.
        let (snapshot, method) = self.adapter.read().await;
        if is_duplicate(&snapshot.registrations, &registration) {
            return AddResult {
                success: true,
                total_count: snapshot.registrations.len(),
                registration,
                method,
                is_duplicate: true,
                removed_count: 0,
            };
        }
        let mut next = snapshot.registrations;
        next.push(registration.clone());
        let removed_count = evict_oldest(&mut next, self.capacity);
        let (success, method) = self.adapter.write(&next).await;

        AddResult {
            success,
            total_count: next.len(),
            registration,
            method,
            is_duplicate: false,
            removed_count,
        }
    }

    /// Full registration list, newest-first by creation timestamp
    /// regardless of storage order.
    pub async fn list(&self) -> (Vec<Registration>, StorageMethod) {
        let (snapshot, method) = self.adapter.read().await;
        let mut registrations = snapshot.registrations;
        sort_newest_first(&mut registrations);
        (registrations, method)
    }

    /// Statistics derived from a fresh read.
    pub async fn stats(&self) -> StorageStats {
        let (snapshot, method) = self.adapter.read().await;
        let storage_used = serialized_size_mb(&snapshot.registrations);

        StorageStats {
            total_registrations: snapshot.registrations.len(),
            max_capacity: self.capacity,
            storage_used,
            storage_method: method,
            estimated_storage_remaining_mb: STORAGE_LIMIT_MB - storage_used,
            storage_limit_mb: STORAGE_LIMIT_MB,
        }
    }

    /// Records a keep-alive heartbeat on the active backend.
    pub async fn heartbeat(&self, now: chrono::DateTime<chrono::Utc>) -> Result<u64> {
        self.adapter.heartbeat(now).await
    }
}
