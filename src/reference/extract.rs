//! Reference-number extraction and commit-message helpfulness.

use std::sync::LazyLock;

use regex::Regex;

/// Reference patterns, most explicit first. The first pattern with any match
/// decides the result.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static REFERENCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:fix(?:es|ed)?|close[sd]?|resolve[sd]?)\s+#(\d+)",
        r"#(\d+)",
        r"(?i)\bPR:?\s*(\d+)",
        r"(?i)\bpull request\s+#?(\d+)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Whole-message phrases that say nothing about the change.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static GENERIC_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^(?:update|fix|changes|wip|work in progress|merge|bump|merge branch\b.*|merge pull request\b.*)$",
    )
    .unwrap()
});

/// Messages shorter than this (after trimming) are never helpful.
const MIN_HELPFUL_LEN: usize = 10;

/// Returns the first reference number found in `text`.
///
/// Patterns are tried in priority order, so `"fixes #1 and closes #2"`
/// yields `1`, and an explicit close keyword beats an earlier bare `#N`.
pub fn extract_reference_number(text: &str) -> Option<u64> {
    let number = REFERENCE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text).and_then(|caps| caps.get(1)))?;
    // An unparseable number on the winning pattern does not fall through to
    // lower-priority patterns.
    number.as_str().parse().ok()
}

/// Returns false for messages too short or too generic to describe a change.
pub fn is_message_helpful(message: &str) -> bool {
    let trimmed = message.trim();
    trimmed.chars().count() >= MIN_HELPFUL_LEN && !GENERIC_MESSAGE.is_match(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_close_keyword_reference() {
        assert_eq!(extract_reference_number("Fixes #123"), Some(123));
        assert_eq!(extract_reference_number("resolved #9 in parser"), Some(9));
    }

    #[test]
    fn first_pattern_match_wins() {
        assert_eq!(extract_reference_number("fixes #1 and closes #2"), Some(1));
    }

    #[test]
    fn close_keyword_beats_earlier_bare_reference() {
        assert_eq!(
            extract_reference_number("see #10, closes #20"),
            Some(20)
        );
    }

    #[test]
    fn overflowing_number_does_not_fall_through() {
        assert_eq!(
            extract_reference_number("fixes #99999999999999999999999, see PR 5"),
            None
        );
    }

    #[test]
    fn extracts_bare_hash_reference() {
        assert_eq!(extract_reference_number("Tidy up (#77)"), Some(77));
    }

    #[test]
    fn extracts_pr_prefix_reference() {
        assert_eq!(extract_reference_number("PR: 45"), Some(45));
        assert_eq!(extract_reference_number("pr 46 follow-up"), Some(46));
    }

    #[test]
    fn extracts_pull_request_reference() {
        assert_eq!(
            extract_reference_number("Merge pull request 812 from dev/feature"),
            Some(812)
        );
    }

    #[test]
    fn no_reference_returns_none() {
        assert_eq!(extract_reference_number("wip"), None);
        assert_eq!(extract_reference_number("bump version to 2"), None);
    }

    #[test]
    fn generic_messages_are_unhelpful() {
        for message in [
            "update",
            "Fix",
            "changes",
            "WIP",
            "work in progress",
            "merge",
            "bump",
            "Merge branch 'main' into feature/login",
            "Merge pull request #12 from org/branch",
        ] {
            assert!(!is_message_helpful(message), "{message:?} should be unhelpful");
        }
    }

    #[test]
    fn short_messages_are_unhelpful() {
        assert!(!is_message_helpful("fix #123"));
        assert!(!is_message_helpful("  tweak   "));
    }

    #[test]
    fn generic_phrase_must_match_whole_message() {
        assert!(is_message_helpful("update the billing retry schedule"));
        assert!(is_message_helpful("Fix race in session cleanup"));
    }

    // ── property tests ────────────────────────────────────────────

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn helpfulness_ignores_surrounding_whitespace(
                core in "[a-zA-Z #0-9]{0,30}",
                left in "[ \t\n]{0,4}",
                right in "[ \t\n]{0,4}",
            ) {
                let padded = format!("{left}{core}{right}");
                prop_assert_eq!(is_message_helpful(&padded), is_message_helpful(padded.trim()));
            }

            #[test]
            fn extracted_number_appears_in_text(text in "[a-z #:0-9]{0,60}") {
                if let Some(n) = extract_reference_number(&text) {
                    prop_assert!(text.contains(&n.to_string()));
                }
            }
        }
    }
}
