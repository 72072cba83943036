//! Input validation for new curses

use thiserror::Error;

/// Maximum target name length, in characters
pub const MAX_TARGET_NAME_LEN: usize = 100;

/// Maximum curse text length, in characters
pub const MAX_CURSE_TEXT_LEN: usize = 500;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Le nom est obligatoire")]
    EmptyTargetName,

    #[error("La malédiction est obligatoire")]
    EmptyCurseText,

    #[error("Le nom est trop long (max 100 caractères)")]
    TargetNameTooLong,

    #[error("La malédiction est trop longue (max 500 caractères)")]
    CurseTextTooLong,
}

/// A validated, trimmed curse submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCurse {
    target_name: String,
    curse_text: String,
}

impl NewCurse {
    /// Trim and check both fields. Emptiness is reported before length, and
    /// the target name before the text.
    pub fn parse(target_name: &str, curse_text: &str) -> Result<Self, ValidationError> {
        let target_name = target_name.trim();
        let curse_text = curse_text.trim();

        if target_name.is_empty() {
            return Err(ValidationError::EmptyTargetName);
        }
        if curse_text.is_empty() {
            return Err(ValidationError::EmptyCurseText);
        }
        if target_name.chars().count() > MAX_TARGET_NAME_LEN {
            return Err(ValidationError::TargetNameTooLong);
        }
        if curse_text.chars().count() > MAX_CURSE_TEXT_LEN {
            return Err(ValidationError::CurseTextTooLong);
        }

        Ok(Self {
            target_name: target_name.to_string(),
            curse_text: curse_text.to_string(),
        })
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn curse_text(&self) -> &str {
        &self.curse_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_and_trims() {
        let new = NewCurse::parse("  Jean  ", " Qu'il perde ses clés ").unwrap();
        assert_eq!(new.target_name(), "Jean");
        assert_eq!(new.curse_text(), "Qu'il perde ses clés");
    }

    #[test]
    fn test_rejects_blank_fields() {
        assert_eq!(
            NewCurse::parse("   ", "text"),
            Err(ValidationError::EmptyTargetName)
        );
        assert_eq!(
            NewCurse::parse("Jean", "\n\t"),
            Err(ValidationError::EmptyCurseText)
        );
        // Both empty: the name is reported first
        assert_eq!(NewCurse::parse("", ""), Err(ValidationError::EmptyTargetName));
    }

    #[test]
    fn test_length_boundaries() {
        let name_100 = "a".repeat(100);
        let name_101 = "a".repeat(101);
        let text_500 = "b".repeat(500);
        let text_501 = "b".repeat(501);

        assert!(NewCurse::parse(&name_100, &text_500).is_ok());
        assert_eq!(
            NewCurse::parse(&name_101, "text"),
            Err(ValidationError::TargetNameTooLong)
        );
        assert_eq!(
            NewCurse::parse("Jean", &text_501),
            Err(ValidationError::CurseTextTooLong)
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 100 two-byte characters
        let name = "é".repeat(100);
        assert!(NewCurse::parse(&name, "text").is_ok());
    }

    #[test]
    fn test_surrounding_whitespace_does_not_count() {
        let padded = format!("   {}   ", "a".repeat(100));
        assert!(NewCurse::parse(&padded, "text").is_ok());
    }
}
