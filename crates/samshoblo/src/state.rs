//! Shared application state.
//!
//! Cloned into every request handler. The repository and dispatcher own
//! all process-wide mutable state; nothing here hands out mutable
//! references to callers.

use std::sync::Arc;

use samshoblo_core::auth::AdminGate;

use crate::{
    config::{BackendConfig, Config},
    notify::{FcmTransport, NotificationDispatcher, WebPushTransport},
    repository::RegistrationRepository,
    storage::{FileStore, RedisStore, SqliteStore, StorageAdapter},
};

#[derive(Clone)]
pub struct AppState {
    pub registrations: Arc<RegistrationRepository>,
    pub notifier: Arc<NotificationDispatcher>,
    pub admin_gate: AdminGate,
    /// Bearer secret for the keep-alive endpoint; `None` leaves it open.
    pub cron_secret: Option<String>,
}

impl AppState {
    /// Builds the state from configuration: selects and initializes the
    /// storage backend, then the push transports. A backend that fails to
    /// initialize degrades the adapter instead of aborting startup.
    pub async fn from_config(config: &Config) -> Self {
        let op_timeout = config.storage_timeout();

        let adapter = match &config.backend {
            BackendConfig::Memory => {
                tracing::warn!(
                    "No storage backend configured; registrations will be lost on restart"
                );
                StorageAdapter::memory_only(op_timeout)
            }
            BackendConfig::File { path } => {
                StorageAdapter::with_primary(Arc::new(FileStore::new(path.as_str())), op_timeout)
            }
            BackendConfig::Redis { url } => match RedisStore::connect(url).await {
                Ok(store) => StorageAdapter::with_primary(Arc::new(store), op_timeout),
                Err(e) => {
                    tracing::error!(error = %e, "Redis unavailable, degrading to memory fallback");
                    StorageAdapter::degraded(op_timeout)
                }
            },
            BackendConfig::Sqlite { path } => match SqliteStore::new(path).await {
                Ok(store) => StorageAdapter::with_primary(Arc::new(store), op_timeout),
                Err(e) => {
                    tracing::error!(error = %e, "SQLite unavailable, degrading to memory fallback");
                    StorageAdapter::degraded(op_timeout)
                }
            },
        };
        tracing::info!(backend = config.backend.describe(), "Storage backend selected");

        let webpush = match &config.vapid {
            Some(vapid) => Some(WebPushTransport::new(vapid)),
            None => {
                tracing::warn!("VAPID keys not configured; web push delivery disabled");
                None
            }
        };

        let fcm = match &config.fcm {
            Some(fcm_config) => match FcmTransport::new(fcm_config).await {
                Ok(transport) => Some(transport),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to initialize gateway push transport");
                    None
                }
            },
            None => {
                tracing::warn!("Gateway credentials not configured; gateway push disabled");
                None
            }
        };

        Self {
            registrations: Arc::new(RegistrationRepository::new(
                adapter,
                config.registration_capacity,
            )),
            notifier: Arc::new(NotificationDispatcher::new(webpush, fcm)),
            admin_gate: AdminGate::new(config.admin_password.clone()),
            cron_secret: config.cron_secret.clone(),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// Memory-only state for router tests: fixed admin password
    /// "test-password", cron secret "test-cron", no push transports.
    pub fn for_tests() -> Self {
        use std::time::Duration;

        Self {
            registrations: Arc::new(RegistrationRepository::new(
                StorageAdapter::memory_only(Duration::from_secs(1)),
                1000,
            )),
            notifier: Arc::new(NotificationDispatcher::new(None, None)),
            admin_gate: AdminGate::new("test-password"),
            cron_secret: Some("test-cron".to_string()),
        }
    }
}
