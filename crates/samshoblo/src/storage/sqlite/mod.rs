//! SQLite registration store.

mod conversions;
mod repository;
mod schema;

pub use repository::SqliteStore;
