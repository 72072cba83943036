//! In-memory curse store (zero-configuration fallback)
//!
//! Data lives only as long as the process.

use async_trait::async_trait;
use curse_core::{tally, BackendKind, Curse, CurseStore, LeaderboardEntry, Result};
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Curses held newest first, so the recent feed is a prefix
pub struct MemoryStore {
    curses: RwLock<VecDeque<Curse>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            curses: RwLock::new(VecDeque::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CurseStore for MemoryStore {
    fn kind(&self) -> BackendKind {
        BackendKind::InMemory
    }

    async fn add_curse(&self, target_name: &str, curse_text: &str) -> Result<Curse> {
        // Stamp under the lock so the deque stays ordered by created_at
        let mut curses = self.curses.write().await;
        let curse = Curse::new(target_name, curse_text);
        curses.push_front(curse.clone());
        Ok(curse)
    }

    async fn get_recent_curses(&self, limit: usize) -> Result<Vec<Curse>> {
        let curses = self.curses.read().await;
        Ok(curses.iter().take(limit).cloned().collect())
    }

    async fn get_curses_for_target(&self, target_name: &str) -> Result<Vec<Curse>> {
        let curses = self.curses.read().await;
        Ok(curses
            .iter()
            .filter(|c| c.is_for(target_name))
            .cloned()
            .collect())
    }

    async fn get_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        // Full rescan on every call
        let curses = self.curses.read().await;
        Ok(tally(curses.iter(), limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryStore::new();

        assert!(store.get_recent_curses(10).await.unwrap().is_empty());
        assert!(store.get_leaderboard(10).await.unwrap().is_empty());
        assert!(store.get_curses_for_target("jean").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_after_write() {
        let store = MemoryStore::new();

        let curse = tokio_test::assert_ok!(store.add_curse(" Jean ", "Qu'il perde ses clés").await);
        assert_eq!(curse.target_name, "Jean");

        let recent = store.get_recent_curses(1).await.unwrap();
        assert_eq!(recent, vec![curse]);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_bounded() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.add_curse("Bob", &format!("curse {}", i)).await.unwrap();
        }

        let recent = store.get_recent_curses(3).await.unwrap();
        let texts: Vec<_> = recent.iter().map(|c| c.curse_text.as_str()).collect();
        assert_eq!(texts, vec!["curse 4", "curse 3", "curse 2"]);
        assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        assert!(store.get_recent_curses(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_target_lookup_ignores_case() {
        let store = MemoryStore::new();
        store.add_curse("Alice", "one").await.unwrap();
        store.add_curse("Bob", "two").await.unwrap();
        store.add_curse("ALICE", "three").await.unwrap();

        let lower = store.get_curses_for_target("alice").await.unwrap();
        let upper = store.get_curses_for_target("ALICE").await.unwrap();

        assert_eq!(lower, upper);
        assert_eq!(lower.len(), 2);
        assert_eq!(lower[0].curse_text, "three");
    }

    #[tokio::test]
    async fn test_leaderboard_scenario() {
        let store = MemoryStore::new();
        store
            .add_curse("Jean", "Que ses lacets se défassent")
            .await
            .unwrap();
        store.add_curse("jean", "Qu'il perde ses clés").await.unwrap();

        let board = store.get_leaderboard(10).await.unwrap();
        assert_eq!(board, vec![LeaderboardEntry::new("jean", 2)]);
    }

    #[tokio::test]
    async fn test_reads_are_idempotent() {
        let store = MemoryStore::new();
        store.add_curse("Bob", "one").await.unwrap();
        store.add_curse("bob", "two").await.unwrap();
        store.add_curse("Carol", "three").await.unwrap();

        assert_eq!(
            store.get_leaderboard(10).await.unwrap(),
            store.get_leaderboard(10).await.unwrap()
        );
        assert_eq!(
            store.get_recent_curses(10).await.unwrap(),
            store.get_recent_curses(10).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let name = if i % 2 == 0 { "Bob" } else { "BOB" };
                    store.add_curse(name, "again").await.unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let board = store.get_leaderboard(10).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].count, 20);

        let recent = store.get_recent_curses(20).await.unwrap();
        assert_eq!(recent.len(), 20);
        assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
