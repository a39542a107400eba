//! Concrete storage backends and the adapter that fronts them.
//!
//! All four backends (`memory`, `file`, `redis`, `sqlite`) implement
//! `samshoblo_core::storage::RegistrationStore`. Unlike compile-time
//! feature selection, the active backend is picked once at startup from
//! configuration presence, because a failing or unconfigured backend must
//! degrade at runtime to the in-process fallback store.

mod adapter;
mod file;
mod memory;
mod redis_impl;
mod sqlite;

pub use adapter::StorageAdapter;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use redis_impl::RedisStore;
pub use sqlite::SqliteStore;
