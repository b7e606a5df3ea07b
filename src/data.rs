//! Report structures handed to the output renderers.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::achievement::AchievementResult;
use crate::git::CommitRecord;
use crate::impact::{ImpactAssessment, ImpactTier};
use crate::reference::ReferenceInfo;

/// One commit's row in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementEntry {
    /// Full commit hash.
    pub hash: String,
    /// Abbreviated commit hash.
    pub short_hash: String,
    /// Commit author.
    pub author: String,
    /// Commit timestamp with the author's offset.
    pub date: DateTime<FixedOffset>,
    /// Commit subject line.
    pub subject: String,
    /// Impact classification.
    pub impact: ImpactAssessment,
    /// Synthesized achievement.
    pub achievement: AchievementResult,
    /// Pull/merge-request reference used or found in the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceInfo>,
}

impl AchievementEntry {
    /// Builds an entry from a commit and its pipeline outputs.
    pub fn new(
        commit: &CommitRecord,
        impact: ImpactAssessment,
        achievement: AchievementResult,
        reference: Option<ReferenceInfo>,
    ) -> Self {
        Self {
            hash: commit.hash.clone(),
            short_hash: commit.short_hash().to_string(),
            author: commit.author.clone(),
            date: commit.date,
            subject: commit.subject.clone(),
            impact,
            achievement,
            reference,
        }
    }
}

/// Number of entries per impact tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSummary {
    /// High-impact entries.
    pub high: usize,
    /// Medium-impact entries.
    pub medium: usize,
    /// Low-impact entries.
    pub low: usize,
}

impl TierSummary {
    /// Counts the tiers of `entries`.
    pub fn from_entries(entries: &[AchievementEntry]) -> Self {
        entries
            .iter()
            .fold(Self::default(), |mut summary, entry| {
                match entry.impact.tier {
                    ImpactTier::High => summary.high += 1,
                    ImpactTier::Medium => summary.medium += 1,
                    ImpactTier::Low => summary.low += 1,
                }
                summary
            })
    }

    /// Total number of entries.
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Complete analysis result, newest entry first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementReport {
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Entries ordered by commit date, newest first.
    pub entries: Vec<AchievementEntry>,
    /// Per-tier counts of `entries`.
    pub summary: TierSummary,
}

impl AchievementReport {
    /// Builds a report, sorting entries by date descending.
    pub fn new(mut entries: Vec<AchievementEntry>) -> Self {
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        let summary = TierSummary::from_entries(&entries);
        Self {
            generated_at: Utc::now(),
            entries,
            summary,
        }
    }
}

/// Serializes a value to YAML.
pub fn to_yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yaml::to_string(data).context("Failed to serialize to YAML")
}
