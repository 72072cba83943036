//! Blob curse store: the whole dataset as one JSON document
//!
//! Every read downloads and parses the full document; every write uploads a
//! new copy of it. There is no conditional write, so two processes adding at
//! the same time can overwrite each other and one curse is silently lost.
//! Writers inside this process are serialized by `write_lock`, which closes
//! the race locally but not across processes.

use async_trait::async_trait;
use curse_core::{tally, BackendKind, Curse, CurseStore, LeaderboardEntry, Result, StorageFailure};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Stored document, curses newest first
#[derive(Debug, Default, Serialize, Deserialize)]
struct CurseDocument {
    curses: Vec<Curse>,
}

pub struct BlobStore {
    http: reqwest::Client,
    object_url: String,
    token: String,
    timeout: Duration,
    write_lock: Mutex<()>,
}

impl BlobStore {
    pub fn new(base_url: &str, object: &str, token: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageFailure::Config(e.to_string()))?;

        let object_url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            object.trim_start_matches('/')
        );
        info!("Blob store object: {}", object);

        Ok(Self {
            http,
            object_url,
            token: token.to_string(),
            timeout,
            write_lock: Mutex::new(()),
        })
    }

    fn http_failure(&self, e: reqwest::Error) -> StorageFailure {
        if e.is_timeout() {
            StorageFailure::Timeout(self.timeout)
        } else {
            // Keep the storage endpoint out of the message
            StorageFailure::Blob(e.without_url().to_string())
        }
    }

    async fn fetch(&self) -> Result<CurseDocument> {
        let response = self
            .http
            .get(&self.object_url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| self.http_failure(e))?;

        // Nothing written yet
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(CurseDocument::default());
        }

        let body = response
            .error_for_status()
            .map_err(|e| self.http_failure(e))?
            .bytes()
            .await
            .map_err(|e| self.http_failure(e))?;

        let document: CurseDocument = serde_json::from_slice(&body)?;
        debug!("Fetched blob document with {} curses", document.curses.len());
        Ok(document)
    }

    async fn upload(&self, document: &CurseDocument) -> Result<()> {
        let body = serde_json::to_vec(document)?;

        self.http
            .put(&self.object_url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.http_failure(e))?
            .error_for_status()
            .map_err(|e| self.http_failure(e))?;

        Ok(())
    }
}

#[async_trait]
impl CurseStore for BlobStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Blob
    }

    async fn add_curse(&self, target_name: &str, curse_text: &str) -> Result<Curse> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.fetch().await?;
        let curse = Curse::new(target_name, curse_text);
        document.curses.insert(0, curse.clone());
        self.upload(&document).await?;

        Ok(curse)
    }

    async fn get_recent_curses(&self, limit: usize) -> Result<Vec<Curse>> {
        let mut document = self.fetch().await?;
        document.curses.truncate(limit);
        Ok(document.curses)
    }

    async fn get_curses_for_target(&self, target_name: &str) -> Result<Vec<Curse>> {
        let document = self.fetch().await?;
        Ok(document
            .curses
            .into_iter()
            .filter(|c| c.is_for(target_name))
            .collect())
    }

    async fn get_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let document = self.fetch().await?;
        Ok(tally(&document.curses, limit))
    }
}
