//! Prompt construction for achievement generation.

use crate::git::CommitRecord;
use crate::impact::ImpactAssessment;

/// Maximum characters of raw diff included in a prompt.
pub const DIFF_PREFIX_CHARS: usize = 2000;

/// Maximum characters of a backend-generated achievement.
pub const MAX_ACHIEVEMENT_CHARS: usize = 150;

/// Maximum number of file paths listed in a prompt.
const MAX_LISTED_FILES: usize = 20;

/// System prompt for achievement generation.
pub const SYSTEM_PROMPT: &str = r#"You write resume bullet points from git commits.

Given one commit, reply with a single achievement statement that:
- starts with a strong past-tense verb (Built, Reduced, Delivered, Hardened, ...)
- describes the outcome or capability, not the mechanics of the diff
- mentions the affected component when it is clear
- stays under 150 characters
- contains no quotes, markdown, prefixes or explanations

Reply with the statement only."#;

/// Builds the user prompt describing one commit.
pub fn generate_user_prompt(
    commit: &CommitRecord,
    assessment: &ImpactAssessment,
    diff: Option<&str>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("Commit message: {}\n", commit.subject));
    if let Some(body) = &commit.body {
        prompt.push_str(&format!("Description: {body}\n"));
    }

    let files = commit.file_list();
    if !files.is_empty() {
        let listed: Vec<&str> = files.iter().take(MAX_LISTED_FILES).map(String::as_str).collect();
        prompt.push_str(&format!("Files changed ({}): {}", files.len(), listed.join(", ")));
        if files.len() > MAX_LISTED_FILES {
            prompt.push_str(", ...");
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "Lines: +{} -{}\n",
        commit.insertions.unwrap_or(0),
        commit.deletions.unwrap_or(0)
    ));
    prompt.push_str(&format!("Impact: {}\n", assessment.tier));
    prompt.push_str(&format!("Signals: {}\n", assessment.signals.join("; ")));

    if !assessment.file_types.is_empty() {
        let types: Vec<String> = assessment
            .file_types
            .iter()
            .filter_map(|t| serde_json::to_value(t).ok())
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        prompt.push_str(&format!("File types: {}\n", types.join(", ")));
    }

    if let Some(diff) = diff.filter(|d| !d.trim().is_empty()) {
        prompt.push_str("\nDiff excerpt:\n");
        prompt.push_str(&truncate_chars(diff, DIFF_PREFIX_CHARS));
        prompt.push('\n');
    }

    prompt
}

/// Normalizes a backend reply into a single achievement line.
///
/// Takes the first non-empty line, strips bullets and surrounding quotes and
/// caps the length. Returns `None` when nothing usable remains.
pub fn clean_response(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = line
        .trim_start_matches(['-', '*', '\u{2022}'])
        .trim()
        .trim_matches(['"', '\'', '`'])
        .trim();

    if line.is_empty() {
        return None;
    }

    Some(truncate_chars(line, MAX_ACHIEVEMENT_CHARS))
}

/// Truncates to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::classify;
    use chrono::DateTime;

    fn commit() -> CommitRecord {
        CommitRecord::new(
            "abc",
            "dev",
            DateTime::parse_from_rfc3339("2024-01-01T00:00:00+00:00").unwrap(),
            "Add rate limiter",
        )
        .with_body("Protects the login endpoint.")
        .with_files(["src/limiter.rs", "tests/limiter.rs"])
        .with_stats(120, 4)
    }

    #[test]
    fn user_prompt_contains_commit_fields() {
        let c = commit();
        let assessment = classify(&c, None);
        let prompt = generate_user_prompt(&c, &assessment, Some("+fn limit() {}\n"));

        assert!(prompt.contains("Commit message: Add rate limiter"));
        assert!(prompt.contains("Description: Protects the login endpoint."));
        assert!(prompt.contains("Files changed (2): src/limiter.rs, tests/limiter.rs"));
        assert!(prompt.contains("Lines: +120 -4"));
        assert!(prompt.contains("Impact: medium"));
        assert!(prompt.contains("File types: test, rust"));
        assert!(prompt.contains("Diff excerpt:\n+fn limit() {}"));
    }

    #[test]
    fn user_prompt_bounds_diff() {
        let c = commit();
        let assessment = classify(&c, None);
        let diff = "+".repeat(DIFF_PREFIX_CHARS * 3);
        let prompt = generate_user_prompt(&c, &assessment, Some(&diff));
        assert!(prompt.len() < DIFF_PREFIX_CHARS + 1000);
    }

    #[test]
    fn user_prompt_omits_missing_diff() {
        let c = commit();
        let assessment = classify(&c, None);
        let prompt = generate_user_prompt(&c, &assessment, None);
        assert!(!prompt.contains("Diff excerpt"));
    }

    #[test]
    fn clean_response_strips_decoration() {
        assert_eq!(
            clean_response("\n  - \"Reduced API latency by 40%\"\nextra"),
            Some("Reduced API latency by 40%".to_string())
        );
    }

    #[test]
    fn clean_response_rejects_blank() {
        assert_eq!(clean_response("  \n \"\" \n"), None);
    }

    #[test]
    fn clean_response_truncates() {
        let long = "x".repeat(400);
        assert_eq!(
            clean_response(&long).map(|s| s.chars().count()),
            Some(MAX_ACHIEVEMENT_CHARS)
        );
    }

    #[test]
    fn truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 60), "short");
    }
}
