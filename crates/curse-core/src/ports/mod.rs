//! Port traits (interfaces) for dependency injection

pub mod storage;

pub use storage::{BackendKind, CurseStore, DEFAULT_LEADERBOARD_LIMIT, DEFAULT_RECENT_LIMIT};
