use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::registration::Registration;

use super::{Backend, Result, SaveOutcome, Snapshot};

/// A concrete store for the full registration set.
///
/// The contract is whole-list read/whole-list write: the set is small
/// (bounded by the capacity ceiling) and every mutation goes through a
/// read-modify-write in the repository layer above.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Which backend this store talks to.
    fn backend(&self) -> Backend;

    /// Loads the current registration set.
    async fn load(&self) -> Result<Snapshot>;

    /// Replaces the stored registration set.
    async fn save(&self, registrations: &[Registration]) -> Result<()>;

    /// Replaces the stored set only if the version still matches `expected`.
    ///
    /// Backends without atomic conditional writes fall through to a plain
    /// save and never report a conflict.
    async fn save_if_version(
        &self,
        registrations: &[Registration],
        expected: u64,
    ) -> Result<SaveOutcome> {
        let _ = expected;
        self.save(registrations).await?;
        Ok(SaveOutcome::Saved)
    }

    /// Records a keep-alive heartbeat and prunes heartbeats older than the
    /// retention window, returning how many were pruned.
    async fn heartbeat(&self, now: DateTime<Utc>) -> Result<u64>;
}
