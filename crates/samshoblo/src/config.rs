use std::{env, time::Duration};

/// Fallback admin secret for local development. Deployments must override
/// this through `ADMIN_PASSWORD`; startup logs a warning when they don't.
pub const DEFAULT_ADMIN_PASSWORD: &str = "georgian2024";

/// Which persistent backend the environment selects. Chosen once at startup;
/// there is no runtime backend switching mid-request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// No persistence configured: registrations live in process memory only.
    Memory,
    File { path: String },
    Redis { url: String },
    Sqlite { path: String },
}

impl BackendConfig {
    pub fn describe(&self) -> &'static str {
        match self {
            BackendConfig::Memory => "memory",
            BackendConfig::File { .. } => "file",
            BackendConfig::Redis { .. } => "redis",
            BackendConfig::Sqlite { .. } => "sqlite",
        }
    }
}

/// VAPID signing material for the standards-based web push transport.
///
/// Only the private half is needed server-side; the public key is shipped
/// to browsers by the frontend that collects subscriptions.
#[derive(Debug, Clone)]
pub struct VapidConfig {
    pub private_key: String,
    pub subject: String,
}

/// Service-account credentials for the push gateway transport.
#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub project_id: String,
    pub private_key: String,
    pub client_email: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret gating the admin listing endpoint.
    pub admin_password: String,
    /// Persistent backend, selected by configuration presence.
    pub backend: BackendConfig,
    /// FIFO eviction ceiling (default: 1000).
    pub registration_capacity: usize,
    /// Per-call deadline for backend operations, in seconds (default: 5).
    pub storage_timeout_seconds: u64,
    /// Bearer secret gating the keep-alive endpoint. When unset the
    /// endpoint is open (matching the cron setup where the platform
    /// injects the secret).
    pub cron_secret: Option<String>,
    pub vapid: Option<VapidConfig>,
    pub fcm: Option<FcmConfig>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Backend selection is a pure function of configuration presence:
    /// `REDIS_URL` wins, then `SQLITE_PATH`, then `STORAGE_FILE`, else the
    /// service runs memory-only.
    pub fn from_env() -> Self {
        let backend = if let Ok(url) = env::var("REDIS_URL") {
            BackendConfig::Redis { url }
        } else if let Ok(path) = env::var("SQLITE_PATH") {
            BackendConfig::Sqlite { path }
        } else if let Ok(path) = env::var("STORAGE_FILE") {
            BackendConfig::File { path }
        } else {
            BackendConfig::Memory
        };

        // Both halves must be present for push to count as configured,
        // even though only the private key is used for signing.
        let vapid = match (env::var("VAPID_PUBLIC_KEY"), env::var("VAPID_PRIVATE_KEY")) {
            (Ok(_), Ok(private_key)) => Some(VapidConfig {
                private_key,
                subject: env::var("VAPID_SUBJECT")
                    .unwrap_or_else(|_| "mailto:admin@samshoblo.com".to_string()),
            }),
            _ => None,
        };

        let fcm = match (
            env::var("FCM_PROJECT_ID"),
            env::var("FCM_PRIVATE_KEY"),
            env::var("FCM_CLIENT_EMAIL"),
        ) {
            (Ok(project_id), Ok(private_key), Ok(client_email)) => Some(FcmConfig {
                project_id,
                // Keys pasted into env vars arrive with literal "\n" sequences.
                private_key: private_key.replace("\\n", "\n"),
                client_email,
            }),
            _ => None,
        };

        Self {
            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
            backend,
            registration_capacity: env::var("REGISTRATION_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(samshoblo_core::registration::DEFAULT_CAPACITY),
            storage_timeout_seconds: env::var("STORAGE_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            cron_secret: env::var("CRON_SECRET").ok(),
            vapid,
            fcm,
        }
    }

    /// Per-call backend deadline as a Duration.
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_timeout_conversion() {
        let config = Config {
            admin_password: "x".to_string(),
            backend: BackendConfig::Memory,
            registration_capacity: 1000,
            storage_timeout_seconds: 7,
            cron_secret: None,
            vapid: None,
            fcm: None,
        };

        assert_eq!(config.storage_timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_backend_describe() {
        assert_eq!(BackendConfig::Memory.describe(), "memory");
        assert_eq!(
            BackendConfig::Redis {
                url: "redis://localhost:6379".to_string()
            }
            .describe(),
            "redis"
        );
    }
}
