//! Curse Types - Pure data types for the curse board
//!
//! This crate contains only plain data and input validation, with no async
//! runtime or storage dependencies.

pub mod curse;
pub mod leaderboard;
pub mod validation;

pub use curse::*;
pub use leaderboard::*;
pub use validation::*;
