//! SQLite implementation of the registration store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio_rusqlite::Connection;

use samshoblo_core::registration::Registration;
use samshoblo_core::storage::{
    Backend, RegistrationStore, Result, Snapshot, StorageError, HEARTBEAT_RETENTION_HOURS,
};

use super::conversions::{format_timestamp, row_to_registration};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-backed registration store.
///
/// The save path replaces the table contents inside one transaction, so a
/// concurrent reader sees either the old set or the new set, never a
/// partial one.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if needed) a file-based database and its schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path.to_string())
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// In-memory database, for tests.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))
    }
}

#[async_trait]
impl RegistrationStore for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn load(&self) -> Result<Snapshot> {
        let registrations = self
            .conn
            .call(|conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_REGISTRATIONS)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([], row_to_registration)
                    .map_err(wrap_err)?;

                let mut registrations = Vec::new();
                for row_result in rows {
                    registrations.push(row_result.map_err(wrap_err)?);
                }
                Ok(registrations)
            })
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(Snapshot {
            registrations,
            version: 0,
        })
    }

    async fn save(&self, registrations: &[Registration]) -> Result<()> {
        let rows: Vec<Registration> = registrations.to_vec();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(schema::DELETE_REGISTRATIONS, [])
                    .map_err(wrap_err)?;
                for r in &rows {
                    tx.execute(
                        schema::INSERT_REGISTRATION,
                        rusqlite::params![
                            r.id,
                            r.child_name,
                            r.child_surname,
                            r.child_age,
                            r.parent_name,
                            r.parent_surname,
                            r.parent_phone,
                            format_timestamp(&r.timestamp),
                        ],
                    )
                    .map_err(wrap_err)?;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))
    }

    async fn heartbeat(&self, now: DateTime<Utc>) -> Result<u64> {
        let created_at = format_timestamp(&now);
        let cutoff = format_timestamp(&(now - Duration::hours(HEARTBEAT_RETENTION_HOURS)));

        self.conn
            .call(move |conn| {
                conn.execute(schema::INSERT_HEARTBEAT, [&created_at])
                    .map_err(wrap_err)?;
                let pruned = conn
                    .execute(schema::DELETE_STALE_HEARTBEATS, [&cutoff])
                    .map_err(wrap_err)?;
                Ok(pruned as u64)
            })
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use samshoblo_core::registration::NewRegistration;

    fn registration(child: &str, phone: &str) -> Registration {
        Registration::from_submission(NewRegistration {
            child_name: child.to_string(),
            child_surname: "Kapanadze".to_string(),
            child_age: "8".to_string(),
            parent_name: "Eka".to_string(),
            parent_surname: "Kapanadze".to_string(),
            parent_phone: phone.to_string(),
        })
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        assert!(store.load().await.unwrap().registrations.is_empty());
    }

    #[tokio::test]
    async fn test_save_preserves_insertion_order() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        let set = vec![
            registration("Mariam", "+995599000001"),
            registration("Giorgi", "+995599000002"),
            registration("Luka", "+995599000003"),
        ];

        store.save(&set).await.unwrap();
        let loaded = store.load().await.unwrap().registrations;

        // Stored timestamps are millisecond precision, so compare by id.
        let loaded_ids: Vec<&str> = loaded.iter().map(|r| r.id.as_str()).collect();
        let saved_ids: Vec<&str> = set.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(loaded_ids, saved_ids);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_contents() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        store
            .save(&[registration("Mariam", "+995599000001")])
            .await
            .unwrap();
        let replacement = vec![registration("Giorgi", "+995599000002")];

        store.save(&replacement).await.unwrap();

        let loaded = store.load().await.unwrap().registrations;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, replacement[0].id);
        assert_eq!(loaded[0].child_name, "Giorgi");
    }

    #[tokio::test]
    async fn test_heartbeat_prunes_stale_rows() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        let old = Utc::now() - Duration::hours(48);

        assert_eq!(store.heartbeat(old).await.unwrap(), 0);
        assert_eq!(store.heartbeat(Utc::now()).await.unwrap(), 1);
    }
}
