//! Server configuration and storage backend selection
//!
//! Everything is read from environment variables once, at startup.

use anyhow::{Context, Result};
use curse_core::BackendKind;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

/// Storage presence flags and tuning knobs
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub database_url: Option<String>,
    pub blob_read_write_token: Option<String>,
    pub blob_base_url: Option<String>,
    #[serde(default = "default_blob_object")]
    pub blob_object: String,
    pub kv_url: Option<String>,
    /// How many recent curses a per-target lookup scans on the key-value backend
    #[serde(default = "default_kv_target_window")]
    pub kv_target_window: usize,
    #[serde(default = "default_storage_timeout_ms")]
    pub storage_timeout_ms: u64,
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_blob_object() -> String {
    "curses.json".to_string()
}

fn default_kv_target_window() -> usize {
    500
}

fn default_storage_timeout_ms() -> u64 {
    5_000
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            blob_read_write_token: None,
            blob_base_url: None,
            blob_object: default_blob_object(),
            kv_url: None,
            kv_target_window: default_kv_target_window(),
            storage_timeout_ms: default_storage_timeout_ms(),
        }
    }
}

impl StorageSettings {
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }
}

/// Load both config sections from the process environment
pub fn load_from_env() -> Result<(ServerConfig, StorageSettings)> {
    let source = config::Config::builder()
        .add_source(config::Environment::default())
        .build()
        .context("Failed to read environment")?;

    load(source)
}

pub fn load(source: config::Config) -> Result<(ServerConfig, StorageSettings)> {
    let server = source
        .clone()
        .try_deserialize::<ServerConfig>()
        .context("Invalid server configuration")?;
    let storage = source
        .try_deserialize::<StorageSettings>()
        .context("Invalid storage configuration")?;

    Ok((server, storage))
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// Pick the storage backend for this process.
///
/// Checks run in a fixed order and the first hit wins. With nothing
/// configured the in-memory backend is used; that is the expected local
/// development path, not an error.
pub fn select_backend(settings: &StorageSettings) -> BackendKind {
    if present(&settings.database_url) {
        BackendKind::Relational
    } else if present(&settings.blob_read_write_token) && present(&settings.blob_base_url) {
        BackendKind::Blob
    } else if present(&settings.kv_url) {
        BackendKind::KeyValue
    } else {
        BackendKind::InMemory
    }
}
