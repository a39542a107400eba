use thiserror::Error;

/// Errors that can occur during storage backend operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Operation timed out after {0}s")]
    Timeout(u64),
}

/// Result type for storage backend operations.
pub type Result<T> = std::result::Result<T, StorageError>;
