//! Storage layer
//!
//! Four interchangeable backends behind [`CurseStore`]. Exactly one is built
//! at startup and shared by every handler.

pub mod blob;
pub mod db;
pub mod kv;
pub mod memory;

pub use blob::BlobStore;
pub use db::Database;
pub use kv::{KvKeys, KvStore};
pub use memory::MemoryStore;

use crate::settings::{select_backend, StorageSettings};
use curse_core::{BackendKind, CurseStore, Result, StorageFailure};
use std::sync::Arc;
use tracing::{info, warn};

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StorageFailure::Config(format!("{} is not set", name)))
}

/// Build the backend chosen by [`select_backend`]
pub async fn connect(settings: &StorageSettings) -> Result<Arc<dyn CurseStore>> {
    let kind = select_backend(settings);
    let timeout = settings.storage_timeout();
    info!("Selected storage backend: {}", kind);

    let store: Arc<dyn CurseStore> = match kind {
        BackendKind::Relational => {
            let url = required(&settings.database_url, "DATABASE_URL")?;
            Arc::new(Database::connect(url, timeout).await?)
        }
        BackendKind::Blob => {
            let base_url = required(&settings.blob_base_url, "BLOB_BASE_URL")?;
            let token = required(&settings.blob_read_write_token, "BLOB_READ_WRITE_TOKEN")?;
            Arc::new(BlobStore::new(
                base_url,
                &settings.blob_object,
                token,
                timeout,
            )?)
        }
        BackendKind::KeyValue => {
            let url = required(&settings.kv_url, "KV_URL")?;
            Arc::new(
                KvStore::connect(url, KvKeys::default(), settings.kv_target_window, timeout)
                    .await?,
            )
        }
        BackendKind::InMemory => {
            warn!("No storage configured, curses will be lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(store)
}
