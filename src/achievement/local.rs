//! Offline achievement synthesis from commit metadata and diff text.

use tracing::debug;

use super::patterns::{TemplateKind, ACTIONS, COMPONENTS, TEMPLATES};
use super::{AchievementResult, GENERIC_CONFIDENCE, TEMPLATE_CONFIDENCE};
use crate::git::CommitRecord;
use crate::impact::classifier::{categorize_file, count_diff_lines};
use crate::impact::{FileCategory, ImpactAssessment, ImpactTier};

/// File count above which a high-impact commit counts as a major feature.
const MAJOR_FEATURE_FILES: usize = 10;

/// Builds an achievement from pattern tables alone.
///
/// Returns `None` only for an empty commit: no changed files and no diff.
pub fn synthesize_local(
    commit: &CommitRecord,
    assessment: &ImpactAssessment,
    diff: Option<&str>,
) -> Option<AchievementResult> {
    let files = commit.file_list();
    let diff = diff.unwrap_or("");
    if files.is_empty() && diff.trim().is_empty() {
        debug!(commit = commit.short_hash(), "Empty commit, nothing to describe");
        return None;
    }

    let diff_lower = diff.to_lowercase();
    let text_lower = commit.full_text().to_lowercase();

    let (added, removed) = if diff.is_empty() {
        (
            commit.insertions.unwrap_or(0),
            commit.deletions.unwrap_or(0),
        )
    } else {
        count_diff_lines(diff)
    };

    let component = detect_component(files, &diff_lower);
    let action = detect_action(&text_lower, &diff_lower, added, removed);
    let file_count = assessment.metrics.files_modified.max(1);

    let matched = TEMPLATES
        .iter()
        .find(|(_, pattern)| pattern.is_match(&text_lower))
        .map(|(kind, _)| *kind);

    debug!(
        commit = commit.short_hash(),
        component,
        action,
        template = ?matched,
        "Local synthesis"
    );

    let result = match matched {
        Some(kind) => AchievementResult::pattern(
            render_template(kind, component, action, file_count),
            TEMPLATE_CONFIDENCE,
        ),
        None => AchievementResult::pattern(
            render_by_tier(assessment, component),
            GENERIC_CONFIDENCE,
        ),
    };
    Some(result)
}

/// Picks the component label with the highest path and diff score.
///
/// A matching path scores 2, each keyword occurrence in the diff scores 1.
/// Ties go to the earlier table entry. Without any score the label comes
/// from file extensions, defaulting to `System`.
pub fn detect_component(files: &[String], diff_lower: &str) -> &'static str {
    let mut best: Option<(&'static str, usize)> = None;

    for (label, pattern) in COMPONENTS.iter() {
        let path_hits = files
            .iter()
            .filter(|f| pattern.is_match(&f.to_lowercase()))
            .count();
        let diff_hits = pattern.find_iter(diff_lower).count();
        let score = path_hits * 2 + diff_hits;

        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((label, score));
        }
    }

    match best {
        Some((label, _)) => label,
        None => component_from_extensions(files),
    }
}

fn component_from_extensions(files: &[String]) -> &'static str {
    let categories: Vec<FileCategory> = files.iter().filter_map(|f| categorize_file(f)).collect();

    if categories
        .iter()
        .any(|c| matches!(c, FileCategory::Markup | FileCategory::Style))
    {
        "UI"
    } else if categories.iter().any(|c| {
        matches!(
            c,
            FileCategory::Python
                | FileCategory::Rust
                | FileCategory::Go
                | FileCategory::Jvm
                | FileCategory::Ruby
                | FileCategory::Php
                | FileCategory::CSharp
                | FileCategory::Native
        )
    }) {
        "Backend"
    } else if categories.contains(&FileCategory::Sql) {
        "Database"
    } else {
        "System"
    }
}

/// Picks the action gerund for the commit.
///
/// The first action keyword found in the commit text or diff wins. Otherwise
/// the shape of the change decides: mostly additions read as implementing,
/// mostly removals as fixing.
pub fn detect_action(
    text_lower: &str,
    diff_lower: &str,
    added: usize,
    removed: usize,
) -> &'static str {
    if let Some((_, gerund)) = ACTIONS
        .iter()
        .find(|(pattern, _)| pattern.is_match(text_lower) || pattern.is_match(diff_lower))
    {
        return gerund;
    }

    if added > removed * 2 {
        "implementing"
    } else if removed > added * 2 {
        "fixing"
    } else {
        "improving"
    }
}

fn render_template(kind: TemplateKind, component: &str, action: &str, files: usize) -> String {
    match kind {
        TemplateKind::Performance => {
            format!("Improved {component} performance by {action} critical code paths")
        }
        TemplateKind::Security => {
            format!("Strengthened {component} security by {action} sensitive code paths")
        }
        TemplateKind::Feature => format!(
            "Delivered new {component} functionality across {}",
            count_files(files)
        ),
        TemplateKind::Bugfix => {
            format!("Resolved {component} defects, improving system reliability")
        }
        TemplateKind::Testing => format!(
            "Expanded {component} test coverage across {}",
            count_files(files)
        ),
    }
}

fn render_by_tier(assessment: &ImpactAssessment, component: &str) -> String {
    let files = assessment.metrics.files_modified;
    match assessment.tier {
        ImpactTier::High if files > MAJOR_FEATURE_FILES => {
            format!("Delivered major {component} feature affecting {files} modules")
        }
        ImpactTier::High => format!("Completed high-impact {component} work"),
        ImpactTier::Medium => format!("Delivered {component} feature"),
        ImpactTier::Low => format!("Made {component} improvements"),
    }
}

fn count_files(n: usize) -> String {
    if n == 1 {
        "1 file".to_string()
    } else {
        format!("{n} files")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::classify;
    use chrono::DateTime;

    fn commit(subject: &str, files: &[&str], insertions: usize, deletions: usize) -> CommitRecord {
        CommitRecord::new(
            "2222222222222222222222222222222222222222",
            "dev",
            DateTime::parse_from_rfc3339("2024-03-01T12:00:00+00:00").unwrap(),
            subject,
        )
        .with_files(files.iter().copied())
        .with_stats(insertions, deletions)
    }

    fn files(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn component_prefers_path_matches() {
        let paths = files(&["src/auth/login.rs", "src/auth/session.rs"]);
        assert_eq!(detect_component(&paths, ""), "Auth");
    }

    #[test]
    fn component_counts_diff_occurrences() {
        let paths = files(&["src/lib.rs"]);
        let diff = "+let cache = Cache::new();\n+cache.insert(k, v);\n+// cache warmup\n";
        assert_eq!(detect_component(&paths, &diff.to_lowercase()), "Performance");
    }

    #[test]
    fn component_ties_go_to_table_order() {
        // One path hit each for Database and Testing.
        let paths = files(&["db/seed.txt", "mock/data.txt"]);
        assert_eq!(detect_component(&paths, ""), "Database");
    }

    #[test]
    fn component_falls_back_to_extensions() {
        assert_eq!(detect_component(&files(&["index.html"]), ""), "UI");
        assert_eq!(detect_component(&files(&["lib/core.rb"]), ""), "Backend");
        assert_eq!(detect_component(&files(&["scripts/init.sql"]), ""), "Database");
        assert_eq!(detect_component(&files(&["README"]), ""), "System");
    }

    #[test]
    fn action_uses_first_keyword() {
        assert_eq!(detect_action("refactor and fix parser", "", 0, 0), "fixing");
        assert_eq!(detect_action("optimize lookups", "", 0, 0), "optimizing");
    }

    #[test]
    fn action_from_diff_shape() {
        assert_eq!(detect_action("wip", "", 30, 5), "implementing");
        assert_eq!(detect_action("wip", "", 5, 30), "fixing");
        assert_eq!(detect_action("wip", "", 10, 10), "improving");
    }

    #[test]
    fn performance_template_wins_first() {
        let c = commit("Speed up and fix report query", &["src/report.py"], 20, 10);
        let assessment = classify(&c, None);
        let result = synthesize_local(&c, &assessment, None).unwrap();
        assert!(result.text.starts_with("Improved "));
        assert!(result.text.contains("by fixing"));
        assert_eq!(result.confidence, TEMPLATE_CONFIDENCE);
    }

    #[test]
    fn feature_template_counts_files() {
        let c = commit(
            "Add export button",
            &["web/export.html", "web/export.css"],
            40,
            0,
        );
        let assessment = classify(&c, None);
        let result = synthesize_local(&c, &assessment, None).unwrap();
        assert_eq!(result.text, "Delivered new UI functionality across 2 files");
    }

    #[test]
    fn unmatched_low_commit_uses_tier_fallback() {
        let c = commit("wip", &["src/main.rs"], 3, 1);
        let assessment = classify(&c, None);
        assert_eq!(assessment.tier, ImpactTier::Low);
        let result = synthesize_local(&c, &assessment, None).unwrap();
        assert_eq!(result.text, "Made Backend improvements");
        assert_eq!(result.confidence, GENERIC_CONFIDENCE);
        assert!(result.data_local);
    }

    #[test]
    fn unmatched_large_commit_names_module_count() {
        let paths: Vec<String> = (0..12).map(|i| format!("src/mod{i}.rs")).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let c = commit("misc", &refs, 400, 200);
        let assessment = classify(&c, None);
        assert_eq!(assessment.tier, ImpactTier::High);
        let result = synthesize_local(&c, &assessment, None).unwrap();
        assert_eq!(
            result.text,
            "Delivered major Backend feature affecting 12 modules"
        );
    }

    #[test]
    fn empty_commit_yields_nothing() {
        let c = commit("Empty", &[], 0, 0);
        let assessment = classify(&c, None);
        assert!(synthesize_local(&c, &assessment, Some("  ")).is_none());
    }
}
