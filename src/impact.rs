//! Commit impact classification.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod classifier;
pub(crate) mod patterns;

pub use classifier::classify;

/// Signal used when nothing more specific applies.
pub const STANDARD_COMMIT_SIGNAL: &str = "Standard commit";

/// Signal appended when the diff mentions performance work.
pub const PERFORMANCE_SIGNAL: &str = "Performance-related changes detected";

/// Coarse significance of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactTier {
    /// Large, risky or security-relevant changes.
    High,
    /// Moderately sized changes.
    Medium,
    /// Small, contained changes.
    Low,
}

impl ImpactTier {
    /// Lower-case name used in prompts and tabular output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Emoji used by the Markdown renderer.
    pub fn emoji(self) -> &'static str {
        match self {
            Self::High => "\u{1f525}",
            Self::Medium => "\u{2b50}",
            Self::Low => "\u{2705}",
        }
    }
}

impl fmt::Display for ImpactTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad file-type category of a changed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// Test sources and fixtures.
    Test,
    /// Python sources.
    Python,
    /// JavaScript sources.
    JavaScript,
    /// TypeScript sources.
    TypeScript,
    /// Rust sources.
    Rust,
    /// Go sources.
    Go,
    /// Java and Kotlin sources.
    Jvm,
    /// Ruby sources.
    Ruby,
    /// PHP sources.
    Php,
    /// C and C++ sources.
    Native,
    /// C# sources.
    CSharp,
    /// Swift sources.
    Swift,
    /// Configuration files.
    Config,
    /// Stylesheets.
    Style,
    /// HTML and template markup.
    Markup,
    /// Documentation.
    Docs,
    /// SQL scripts.
    Sql,
    /// Shell scripts.
    Shell,
}

/// Size metrics of a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMetrics {
    /// Insertions plus deletions.
    pub total_lines: usize,
    /// Number of changed paths.
    pub files_modified: usize,
    /// Number of changed paths matching the critical-path table.
    pub critical_files_modified: usize,
}

/// Outcome of classifying one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactAssessment {
    /// Impact tier.
    pub tier: ImpactTier,
    /// Human-readable reasons, in the order they were found. Never empty.
    pub signals: Vec<String>,
    /// Categories of the changed files.
    pub file_types: BTreeSet<FileCategory>,
    /// Size metrics.
    pub metrics: ChangeMetrics,
}

impl ImpactAssessment {
    /// Returns true when the performance signal was raised.
    pub fn has_performance_signal(&self) -> bool {
        has_performance_signal(&self.signals)
    }
}

fn has_performance_signal(signals: &[String]) -> bool {
    signals.iter().any(|s| s == PERFORMANCE_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&ImpactTier::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }

    #[test]
    fn tier_emojis_are_distinct() {
        assert_ne!(ImpactTier::High.emoji(), ImpactTier::Medium.emoji());
        assert_ne!(ImpactTier::Medium.emoji(), ImpactTier::Low.emoji());
    }

    #[test]
    fn file_category_serializes_lowercase() {
        let json = serde_json::to_string(&FileCategory::TypeScript).unwrap();
        assert_eq!(json, "\"typescript\"");
    }
}
