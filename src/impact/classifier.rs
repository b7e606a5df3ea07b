//! Scores a commit's size and risk into an [`ImpactAssessment`].

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use super::patterns::{
    CONFIG_FILE_NAMES, CRITICAL_KEYWORDS, CRITICAL_PATHS, EXTENSION_CATEGORIES,
    PERFORMANCE_KEYWORDS, TEST_PATHS,
};
use super::{
    has_performance_signal, ChangeMetrics, FileCategory, ImpactAssessment, ImpactTier,
    PERFORMANCE_SIGNAL, STANDARD_COMMIT_SIGNAL,
};
use crate::git::CommitRecord;

const LARGE_CHANGE_LINES: usize = 500;
const MODERATE_CHANGE_LINES: usize = 100;
const MIN_MULTI_FILES: usize = 3;
const MAX_MULTI_FILES: usize = 10;
const FEW_FILES: usize = 2;

/// Classifies a commit.
///
/// `diff` is the commit's unified diff when it could be retrieved. Without
/// it, keyword and structural signals are skipped and only metadata is used.
/// This never fails.
pub fn classify(commit: &CommitRecord, diff: Option<&str>) -> ImpactAssessment {
    let files = commit.file_list();
    let total_lines = commit.total_lines();
    let files_modified = files.len();

    let mut signals = Vec::new();

    let mut critical_files_modified = 0;
    for path in files {
        if is_critical_path(path) {
            critical_files_modified += 1;
            signals.push(format!("Critical file modified: {path}"));
        }
    }

    let file_types: BTreeSet<FileCategory> =
        files.iter().filter_map(|f| categorize_file(f)).collect();

    if let Some(diff) = diff {
        signals.extend(diff_signals(diff));
    }

    let metrics = ChangeMetrics {
        total_lines,
        files_modified,
        critical_files_modified,
    };

    let tier = decide_tier(&metrics, &mut signals);

    if signals.is_empty() {
        signals.push(STANDARD_COMMIT_SIGNAL.to_string());
    }

    debug!(
        commit = commit.short_hash(),
        tier = %tier,
        total_lines,
        files_modified,
        critical_files_modified,
        "Classified commit"
    );

    ImpactAssessment {
        tier,
        signals,
        file_types,
        metrics,
    }
}

/// Returns true when the path matches the critical-path table.
pub fn is_critical_path(path: &str) -> bool {
    CRITICAL_PATHS.is_match(&path.to_lowercase())
}

/// Maps a path to at most one file category.
///
/// Test markers win over extensions so `tests/foo.rs` counts as test code.
pub fn categorize_file(path: &str) -> Option<FileCategory> {
    let lower = path.to_lowercase();

    if TEST_PATHS.is_match(&lower) {
        return Some(FileCategory::Test);
    }

    let path = Path::new(&lower);
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if CONFIG_FILE_NAMES
        .iter()
        .any(|name| file_name == *name || file_name.starts_with(&format!("{name}.")))
    {
        return Some(FileCategory::Config);
    }

    let extension = path.extension().and_then(|e| e.to_str())?;
    EXTENSION_CATEGORIES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, category)| *category)
}

/// Counts added and removed lines, ignoring the `+++`/`---` file headers.
pub fn count_diff_lines(diff: &str) -> (usize, usize) {
    diff.lines().fold((0, 0), |(added, removed), line| {
        if line.starts_with('+') && !line.starts_with("+++") {
            (added + 1, removed)
        } else if line.starts_with('-') && !line.starts_with("---") {
            (added, removed + 1)
        } else {
            (added, removed)
        }
    })
}

/// Keyword and structural signals derived from the diff text.
fn diff_signals(diff: &str) -> Vec<String> {
    let mut signals = Vec::new();
    let lower = diff.to_lowercase();

    if let Some(keyword) = CRITICAL_KEYWORDS.iter().find(|k| lower.contains(*k)) {
        signals.push(format!("Critical keyword found: {keyword}"));
    }

    if PERFORMANCE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        signals.push(PERFORMANCE_SIGNAL.to_string());
    }

    let (added, removed) = count_diff_lines(diff);

    // Independent checks; overlapping thresholds may raise more than one.
    if added > 100 && removed > 100 {
        signals.push("Large refactoring detected".to_string());
    }
    if added > 200 && removed < 50 {
        signals.push("New feature implementation".to_string());
    }
    if removed > 50 && (added as f64) < (removed as f64) * 0.5 {
        signals.push("Bug fix pattern detected".to_string());
    }

    signals
}

/// Picks the tier top-down and appends the matching size signals.
fn decide_tier(metrics: &ChangeMetrics, signals: &mut Vec<String>) -> ImpactTier {
    let ChangeMetrics {
        total_lines,
        files_modified,
        critical_files_modified,
    } = *metrics;

    let critical_signal = signals.iter().any(|s| s.contains("Critical"));
    if total_lines > LARGE_CHANGE_LINES || critical_files_modified > 0 || critical_signal {
        if total_lines > LARGE_CHANGE_LINES {
            signals.push(format!("Large change: {total_lines} lines"));
        }
        return ImpactTier::High;
    }

    let moderate_lines = (MODERATE_CHANGE_LINES..=LARGE_CHANGE_LINES).contains(&total_lines);
    let multiple_files = (MIN_MULTI_FILES..=MAX_MULTI_FILES).contains(&files_modified);
    let performance = has_performance_signal(signals);
    if moderate_lines || multiple_files || performance {
        if moderate_lines {
            signals.push(format!("Moderate change: {total_lines} lines"));
        }
        if multiple_files {
            signals.push(format!("Multiple files: {files_modified} files"));
        }
        return ImpactTier::Medium;
    }

    if total_lines < MODERATE_CHANGE_LINES {
        signals.push(format!("Small change: {total_lines} lines"));
    }
    if files_modified <= FEW_FILES {
        signals.push(format!("Few files: {files_modified} file(s)"));
    }
    ImpactTier::Low
}
