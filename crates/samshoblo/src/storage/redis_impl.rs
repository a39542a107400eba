//! Redis key-value registration store.
//!
//! The whole registration set lives as one JSON blob under a fixed key,
//! paired with a monotonic version counter. The counter is what makes the
//! conditional save atomic: a Lua script compares the caller's expected
//! version and only then swaps the blob and bumps the counter, so two
//! racing writers cannot silently lose an update.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::{aio::ConnectionManager, AsyncCommands};

use samshoblo_core::registration::Registration;
use samshoblo_core::storage::{
    Backend, RegistrationStore, Result, SaveOutcome, Snapshot, StorageError,
    HEARTBEAT_RETENTION_HOURS,
};

const DATA_KEY: &str = "registrations";
const VERSION_KEY: &str = "registrations:version";
const HEARTBEAT_KEY: &str = "registrations:heartbeats";

/// Compare-and-set on the version counter. Returns 1 when the write was
/// accepted, 0 when a concurrent writer advanced the version first.
const CAS_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[2]) or '0'
if current == ARGV[2] then
  redis.call('SET', KEYS[1], ARGV[1])
  redis.call('INCR', KEYS[2])
  return 1
end
return 0
"#;

/// Redis-backed registration store.
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connects to Redis and verifies the connection can be established.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        Ok(Self { conn })
    }

    fn serialize(registrations: &[Registration]) -> Result<String> {
        serde_json::to_string(registrations)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl RegistrationStore for RedisStore {
    fn backend(&self) -> Backend {
        Backend::Redis
    }

    async fn load(&self) -> Result<Snapshot> {
        let mut conn = self.conn.clone();

        let (data, version): (Option<String>, Option<u64>) = redis::pipe()
            .get(DATA_KEY)
            .get(VERSION_KEY)
            .query_async(&mut conn)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let registrations = match data {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
            None => Vec::new(),
        };

        Ok(Snapshot {
            registrations,
            version: version.unwrap_or(0),
        })
    }

    async fn save(&self, registrations: &[Registration]) -> Result<()> {
        let payload = Self::serialize(registrations)?;
        let mut conn = self.conn.clone();

        redis::pipe()
            .set(DATA_KEY, payload)
            .ignore()
            .incr(VERSION_KEY, 1)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    async fn save_if_version(
        &self,
        registrations: &[Registration],
        expected: u64,
    ) -> Result<SaveOutcome> {
        let payload = Self::serialize(registrations)?;
        let mut conn = self.conn.clone();

        let accepted: i64 = redis::Script::new(CAS_SCRIPT)
            .key(DATA_KEY)
            .key(VERSION_KEY)
            .arg(payload)
            .arg(expected.to_string())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(if accepted == 1 {
            SaveOutcome::Saved
        } else {
            SaveOutcome::Conflict
        })
    }

    async fn heartbeat(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut conn = self.conn.clone();
        let cutoff = (now - Duration::hours(HEARTBEAT_RETENTION_HOURS)).timestamp();

        let _: i64 = conn
            .zadd(HEARTBEAT_KEY, now.to_rfc3339(), now.timestamp())
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let pruned: u64 = conn
            .zrembyscore(HEARTBEAT_KEY, "-inf", cutoff)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(pruned)
    }
}
