//! Curse types

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A posted curse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curse {
    pub id: String,
    pub target_name: String,
    pub curse_text: String,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

impl Curse {
    /// Build a fresh curse with a new id and the current timestamp.
    ///
    /// Both fields are trimmed. Emptiness and length are checked earlier, by
    /// [`NewCurse::parse`](crate::NewCurse::parse).
    pub fn new(target_name: &str, curse_text: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            target_name: target_name.trim().to_string(),
            curse_text: curse_text.trim().to_string(),
            created_at: Utc::now().timestamp_millis(),
        }
    }

    /// Case-insensitive grouping key of the target
    pub fn target_key(&self) -> String {
        target_key(&self.target_name)
    }

    pub fn is_for(&self, target_name: &str) -> bool {
        self.target_key() == target_key(target_name)
    }
}

/// Normalize a target name into its grouping key
pub fn target_key(target_name: &str) -> String {
    target_name.trim().to_lowercase()
}
