//! Storage contract for curses

use crate::Result;
use async_trait::async_trait;
use curse_types::{Curse, LeaderboardEntry};
use serde::Serialize;

/// Default number of curses in the recent feed
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Default number of leaderboard entries
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 20;

/// Which storage medium backs a [`CurseStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    InMemory,
    KeyValue,
    Blob,
    Relational,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::InMemory => write!(f, "in_memory"),
            BackendKind::KeyValue => write!(f, "key_value"),
            BackendKind::Blob => write!(f, "blob"),
            BackendKind::Relational => write!(f, "relational"),
        }
    }
}

/// Curse store
///
/// One instance is built at startup and shared by every request. Results are
/// owned copies; nothing borrows backend state.
#[async_trait]
pub trait CurseStore: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Persist a new curse and return it as stored
    async fn add_curse(&self, target_name: &str, curse_text: &str) -> Result<Curse>;

    /// Newest first, at most `limit` curses
    async fn get_recent_curses(&self, limit: usize) -> Result<Vec<Curse>>;

    /// Every curse whose target matches case-insensitively, newest first
    async fn get_curses_for_target(&self, target_name: &str) -> Result<Vec<Curse>>;

    /// Targets ranked by curse count, descending, at most `limit` entries
    async fn get_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>>;
}
