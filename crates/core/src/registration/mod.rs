//! Registration records and the rules that govern their storage.

mod operations;
mod types;

pub use operations::{evict_oldest, is_duplicate, serialized_size_mb, sort_newest_first};
pub use types::{NewRegistration, Registration};

/// Maximum number of stored registrations before FIFO eviction kicks in.
pub const DEFAULT_CAPACITY: usize = 1000;
