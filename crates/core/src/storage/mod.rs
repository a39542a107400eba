//! Storage backend abstraction.
//!
//! The service can persist registrations in one of several interchangeable
//! stores (in-memory, flat file, key-value, relational). This module defines
//! the trait those stores implement plus the shared types and errors; the
//! concrete implementations live in the binary crate and are selected at
//! startup from environment configuration.

mod error;
mod traits;
mod types;

pub use error::{Result, StorageError};
pub use traits::RegistrationStore;
pub use types::{Backend, SaveOutcome, Snapshot, StorageMethod};

/// Heartbeats older than this many hours are pruned on every keep-alive.
pub const HEARTBEAT_RETENTION_HOURS: i64 = 24;
