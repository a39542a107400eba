use serde::Serialize;

use crate::registration::Registration;

/// Concrete persistence mechanism behind the storage trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    File,
    Redis,
    Sqlite,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::File => "file",
            Backend::Redis => "redis",
            Backend::Sqlite => "sqlite",
        }
    }
}

/// Point-in-time view of the stored registration set.
///
/// `version` is a monotonic counter for backends that support conditional
/// writes; backends without one report 0 and never produce conflicts.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub registrations: Vec<Registration>,
    pub version: u64,
}

/// Result of a conditional save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// A concurrent writer advanced the version first; nothing was written.
    Conflict,
}

/// The storage mode a read or write actually used, as reported to clients.
///
/// `MemoryFallback` (a configured backend failed and the in-process store
/// answered instead) is deliberately distinct from `MemoryOnly` (nothing was
/// configured in the first place).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageMethod {
    #[serde(rename = "memory-only")]
    MemoryOnly,
    #[serde(rename = "memory-fallback")]
    MemoryFallback,
    #[serde(rename = "file")]
    File,
    #[serde(rename = "redis")]
    Redis,
    #[serde(rename = "sqlite")]
    Sqlite,
}

impl StorageMethod {
    pub fn for_backend(backend: Backend) -> Self {
        match backend {
            Backend::Memory => StorageMethod::MemoryOnly,
            Backend::File => StorageMethod::File,
            Backend::Redis => StorageMethod::Redis,
            Backend::Sqlite => StorageMethod::Sqlite,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageMethod::MemoryOnly => "memory-only",
            StorageMethod::MemoryFallback => "memory-fallback",
            StorageMethod::File => "file",
            StorageMethod::Redis => "redis",
            StorageMethod::Sqlite => "sqlite",
        }
    }

    /// True when the data only lives in process memory and will be lost on
    /// restart. Clients surface a warning in that case.
    pub fn is_memory(&self) -> bool {
        matches!(self, StorageMethod::MemoryOnly | StorageMethod::MemoryFallback)
    }
}
