//! Leaderboard aggregation over a full curse sequence

use curse_types::{Curse, LeaderboardEntry};
use std::collections::HashMap;

/// Group curses by case-insensitive target and rank them by count.
///
/// `curses` must be ordered newest first: the first spelling seen for a key
/// becomes its display name, so the most recent spelling wins. Equal counts
/// are ordered by key, ascending.
pub fn tally<'a, I>(curses: I, limit: usize) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a Curse>,
{
    let mut groups: HashMap<String, (String, u64)> = HashMap::new();

    for curse in curses {
        groups
            .entry(curse.target_key())
            .and_modify(|(_, count)| *count += 1)
            .or_insert_with(|| (curse.target_name.clone(), 1));
    }

    let mut ranked: Vec<(String, String, u64)> = groups
        .into_iter()
        .map(|(key, (name, count))| (key, name, count))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(_, name, count)| LeaderboardEntry::new(name, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curse(target: &str, created_at: i64) -> Curse {
        Curse {
            id: format!("{}-{}", target, created_at),
            target_name: target.to_string(),
            curse_text: "text".to_string(),
            created_at,
        }
    }

    #[test]
    fn test_empty() {
        assert!(tally(&Vec::<Curse>::new(), 10).is_empty());
    }

    #[test]
    fn test_groups_case_insensitively() {
        // Newest first
        let curses = vec![curse("BOB", 3), curse("bob", 2), curse("Bob", 1)];
        let board = tally(&curses, 10);

        assert_eq!(board, vec![LeaderboardEntry::new("BOB", 3)]);
    }

    #[test]
    fn test_most_recent_spelling_wins() {
        let curses = vec![curse("jean", 2), curse("Jean", 1)];
        assert_eq!(tally(&curses, 10), vec![LeaderboardEntry::new("jean", 2)]);
    }

    #[test]
    fn test_orders_by_count_then_key() {
        let curses = vec![
            curse("carol", 6),
            curse("alice", 5),
            curse("Bob", 4),
            curse("bob", 3),
            curse("dave", 2),
            curse("bob", 1),
        ];
        let board = tally(&curses, 10);

        assert_eq!(
            board,
            vec![
                LeaderboardEntry::new("Bob", 3),
                LeaderboardEntry::new("alice", 1),
                LeaderboardEntry::new("carol", 1),
                LeaderboardEntry::new("dave", 1),
            ]
        );
    }

    #[test]
    fn test_truncates_to_limit() {
        let curses = vec![curse("a", 3), curse("b", 2), curse("c", 1)];
        assert_eq!(tally(&curses, 2).len(), 2);
        assert!(tally(&curses, 0).is_empty());
    }
}
