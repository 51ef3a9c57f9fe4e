//! Reaction emoji used as option markers.
//!
//! Options 1–9 use keycap digits, 10 uses the keycap ten, and 11–20 use the
//! regional indicator letters A–J (Discord has no keycap past ten).

/// Highest number of options a poll can carry.
pub const MAX_OPTIONS: usize = 20;

const VARIATION_SELECTOR: char = '\u{fe0f}';

const MARKERS: [&str; MAX_OPTIONS] = [
    "1\u{fe0f}\u{20e3}",
    "2\u{fe0f}\u{20e3}",
    "3\u{fe0f}\u{20e3}",
    "4\u{fe0f}\u{20e3}",
    "5\u{fe0f}\u{20e3}",
    "6\u{fe0f}\u{20e3}",
    "7\u{fe0f}\u{20e3}",
    "8\u{fe0f}\u{20e3}",
    "9\u{fe0f}\u{20e3}",
    "\u{1f51f}",
    "\u{1f1e6}",
    "\u{1f1e7}",
    "\u{1f1e8}",
    "\u{1f1e9}",
    "\u{1f1ea}",
    "\u{1f1eb}",
    "\u{1f1ec}",
    "\u{1f1ed}",
    "\u{1f1ee}",
    "\u{1f1ef}",
];

/// Emoji for the option at 1-based `index`.
pub fn emoji_for(index: usize) -> Option<&'static str> {
    index
        .checked_sub(1)
        .and_then(|i| MARKERS.get(i))
        .copied()
}

/// 1-based option index for a reaction emoji.
///
/// Clients differ on whether keycaps carry U+FE0F, so it is ignored.
pub fn index_for(emoji: &str) -> Option<usize> {
    let bare = strip_variation(emoji);
    MARKERS
        .iter()
        .position(|m| strip_variation(m) == bare)
        .map(|i| i + 1)
}

fn strip_variation(s: &str) -> String {
    s.chars().filter(|c| *c != VARIATION_SELECTOR).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_round_trip_all_indices() {
        for i in 1..=MAX_OPTIONS {
            let emoji = emoji_for(i).unwrap();
            assert_eq!(index_for(emoji), Some(i), "marker {i} ({emoji})");
        }
    }

    #[test]
    fn test_markers_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for m in MARKERS {
            assert!(seen.insert(strip_variation(m)), "duplicate marker {m}");
        }
    }

    #[test]
    fn test_emoji_for_out_of_range() {
        assert_eq!(emoji_for(0), None);
        assert_eq!(emoji_for(21), None);
    }

    #[test]
    fn test_keycap_without_variation_selector() {
        assert_eq!(index_for("1\u{20e3}"), Some(1));
        assert_eq!(index_for("9\u{20e3}"), Some(9));
    }

    #[test]
    fn test_unknown_emoji() {
        assert_eq!(index_for("👍"), None);
        assert_eq!(index_for(""), None);
        assert_eq!(index_for("1"), None);
    }
}
