//! Key-value curse store over the Redis protocol
//!
//! Layout:
//! - `curses`: list of JSON-encoded curses, newest at the head
//! - `leaderboard`: sorted set of lowercase target keys scored by count
//! - `name_display`: hash from lowercase key to the latest spelling
//!
//! The leaderboard is a running counter rather than a recomputation. Per-target
//! lookups only scan the newest `target_window` curses, so older curses still
//! count on the leaderboard but no longer show up for their target.

use async_trait::async_trait;
use curse_core::{
    target_key, BackendKind, Curse, CurseStore, LeaderboardEntry, Result, StorageFailure,
};
use redis::aio::{ConnectionLike, ConnectionManager};
use redis::RedisResult;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Key names used by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvKeys {
    pub curses: String,
    pub leaderboard: String,
    pub names: String,
}

impl Default for KvKeys {
    fn default() -> Self {
        Self::namespaced("")
    }
}

impl KvKeys {
    pub fn namespaced(prefix: &str) -> Self {
        Self {
            curses: format!("{}curses", prefix),
            leaderboard: format!("{}leaderboard", prefix),
            names: format!("{}name_display", prefix),
        }
    }
}

pub struct KvStore<C = ConnectionManager> {
    conn: C,
    keys: KvKeys,
    target_window: usize,
    timeout: Duration,
}

fn kv_err(e: redis::RedisError) -> StorageFailure {
    StorageFailure::KeyValue(e.to_string())
}

impl KvStore<ConnectionManager> {
    pub async fn connect(
        url: &str,
        keys: KvKeys,
        target_window: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = redis::Client::open(url).map_err(kv_err)?;

        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StorageFailure::Timeout(timeout))?
            .map_err(kv_err)?;

        info!("Key-value store connected");

        Ok(Self::with_connection(conn, keys, target_window, timeout))
    }
}

impl<C> KvStore<C>
where
    C: ConnectionLike + Clone + Send + Sync,
{
    pub fn with_connection(conn: C, keys: KvKeys, target_window: usize, timeout: Duration) -> Self {
        Self {
            conn,
            keys,
            target_window,
            timeout,
        }
    }

    /// Run one round trip under the storage timeout
    async fn run<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(kv_err),
            Err(_) => Err(StorageFailure::Timeout(self.timeout)),
        }
    }

    async fn newest(&self, count: usize) -> Result<Vec<Curse>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        let raw: Vec<String> = self
            .run(
                redis::cmd("LRANGE")
                    .arg(&self.keys.curses)
                    .arg(0)
                    .arg(stop_index(count))
                    .query_async(&mut conn),
            )
            .await?;

        raw.iter().map(|item| decode_curse(item)).collect()
    }

    /// Record a curse: list entry, counter and display name in one MULTI/EXEC
    async fn push(&self, curse: &Curse) -> Result<()> {
        let payload = serde_json::to_string(curse)?;
        let key = curse.target_key();

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("LPUSH")
            .arg(&self.keys.curses)
            .arg(&payload)
            .ignore()
            .cmd("ZINCRBY")
            .arg(&self.keys.leaderboard)
            .arg(1)
            .arg(&key)
            .ignore()
            .cmd("HSET")
            .arg(&self.keys.names)
            .arg(&key)
            .arg(&curse.target_name)
            .ignore();

        let mut conn = self.conn.clone();
        self.run(pipe.query_async::<_, ()>(&mut conn)).await
    }
}

#[async_trait]
impl<C> CurseStore for KvStore<C>
where
    C: ConnectionLike + Clone + Send + Sync + 'static,
{
    fn kind(&self) -> BackendKind {
        BackendKind::KeyValue
    }

    async fn add_curse(&self, target_name: &str, curse_text: &str) -> Result<Curse> {
        let curse = Curse::new(target_name, curse_text);
        self.push(&curse).await?;
        Ok(curse)
    }

    async fn get_recent_curses(&self, limit: usize) -> Result<Vec<Curse>> {
        self.newest(limit).await
    }

    async fn get_curses_for_target(&self, target_name: &str) -> Result<Vec<Curse>> {
        let key = target_key(target_name);
        let window = self.newest(self.target_window).await?;
        debug!(
            "Scanned {} recent curses for target lookup",
            window.len()
        );

        Ok(window
            .into_iter()
            .filter(|c| c.target_key() == key)
            .collect())
    }

    async fn get_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        let ranked: Vec<(String, f64)> = self
            .run(
                redis::cmd("ZREVRANGE")
                    .arg(&self.keys.leaderboard)
                    .arg(0)
                    .arg(stop_index(limit))
                    .arg("WITHSCORES")
                    .query_async(&mut conn),
            )
            .await?;

        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<&str> = ranked.iter().map(|(key, _)| key.as_str()).collect();
        let names: Vec<Option<String>> = self
            .run(
                redis::cmd("HMGET")
                    .arg(&self.keys.names)
                    .arg(&keys)
                    .query_async(&mut conn),
            )
            .await?;

        Ok(build_entries(ranked, names))
    }
}

/// Inclusive stop index for `LRANGE`/`ZREVRANGE`, given a positive count
fn stop_index(count: usize) -> isize {
    isize::try_from(count).unwrap_or(isize::MAX) - 1
}

fn decode_curse(raw: &str) -> Result<Curse> {
    Ok(serde_json::from_str(raw)?)
}

/// Pair ranked keys with their display names, falling back to the key itself
fn build_entries(ranked: Vec<(String, f64)>, names: Vec<Option<String>>) -> Vec<LeaderboardEntry> {
    ranked
        .into_iter()
        .zip(names.into_iter().chain(std::iter::repeat(None)))
        .filter(|((_, score), _)| *score >= 1.0)
        .map(|((key, score), name)| {
            LeaderboardEntry::new(name.unwrap_or(key), score.round() as u64)
        })
        .collect()
}
