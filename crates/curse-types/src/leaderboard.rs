//! Leaderboard types

use serde::{Deserialize, Serialize};

/// One ranked target. Always derived from stored curses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Display spelling of the target
    pub name: String,
    pub count: u64,
}

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}
