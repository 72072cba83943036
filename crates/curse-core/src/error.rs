//! Error types for curse storage

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageFailure>;

/// The single failure a storage backend reports.
///
/// Variants only say which medium failed. Messages may contain connection
/// details and must stay in logs, never in responses.
#[derive(Error, Debug)]
pub enum StorageFailure {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Key-value store error: {0}")]
    KeyValue(String),

    #[error("Blob storage error: {0}")]
    Blob(String),

    #[error("Malformed stored data: {0}")]
    Malformed(String),

    #[error("Storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Storage config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for StorageFailure {
    fn from(e: serde_json::Error) -> Self {
        StorageFailure::Malformed(e.to_string())
    }
}
