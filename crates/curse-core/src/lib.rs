//! Curse Core Library
//!
//! The storage contract shared by every backend, its error type, and the
//! leaderboard aggregation used by backends that scan their whole dataset.

// Re-export pure types from curse-types
pub use curse_types::*;

pub mod error;
pub mod leaderboard;
pub mod ports;

pub use error::{Result, StorageFailure};
pub use leaderboard::tally;
pub use ports::{BackendKind, CurseStore, DEFAULT_LEADERBOARD_LIMIT, DEFAULT_RECENT_LIMIT};
