//! Commit-to-achievement pipeline.

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info};

use crate::achievement::Synthesizer;
use crate::data::{AchievementEntry, AchievementReport};
use crate::git::{CommitFilter, CommitSource};
use crate::impact::{classify, ImpactTier};
use crate::sampling::{chance, RandomSource};

/// Default share of low-impact commits kept when sampling.
pub const DEFAULT_SAMPLE_RATE: f64 = 0.3;

/// Pipeline-level failures. Everything else degrades per commit.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The commit source produced nothing to analyze.
    #[error("No commits found in the selected range")]
    NoCommits,

    /// The commit source itself failed.
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

/// Commit selection and post-processing options.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Which commits to read.
    pub filter: CommitFilter,
    /// Drop a share of low-impact commits before synthesis.
    pub sample_low_impact: bool,
    /// Probability of keeping a low-impact commit when sampling.
    pub sample_rate: f64,
    /// Drop achievements below this confidence.
    pub min_confidence: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filter: CommitFilter::default(),
            sample_low_impact: false,
            sample_rate: DEFAULT_SAMPLE_RATE,
            min_confidence: None,
        }
    }
}

/// Runs classification and synthesis over every commit of a source.
pub struct Pipeline<'a> {
    source: &'a dyn CommitSource,
    synthesizer: Synthesizer,
    config: PipelineConfig,
    rng: Box<dyn RandomSource>,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline. `rng` drives both sampling and backend skipping.
    pub fn new(
        source: &'a dyn CommitSource,
        synthesizer: Synthesizer,
        config: PipelineConfig,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            source,
            synthesizer,
            config,
            rng,
        }
    }

    /// Processes commits one at a time and returns the sorted report.
    pub async fn run(&mut self) -> Result<AchievementReport, PipelineError> {
        let commits = self
            .source
            .list_commits(&self.config.filter)
            .context("Failed to read commits")?;

        if commits.is_empty() {
            return Err(PipelineError::NoCommits);
        }

        info!(count = commits.len(), "Analyzing commits");

        let mut entries = Vec::with_capacity(commits.len());
        let mut sampled_out = 0usize;
        let mut below_threshold = 0usize;

        for commit in &commits {
            let diff = match self.source.diff_text(&commit.hash) {
                Ok(diff) => Some(diff),
                Err(e) => {
                    debug!(commit = commit.short_hash(), "Diff unavailable: {e}");
                    None
                }
            };

            let impact = classify(commit, diff.as_deref());

            if self.config.sample_low_impact
                && impact.tier == ImpactTier::Low
                && !chance(self.rng.as_mut(), self.config.sample_rate)
            {
                debug!(commit = commit.short_hash(), "Low-impact commit sampled out");
                sampled_out += 1;
                continue;
            }

            let synthesis = self
                .synthesizer
                .synthesize(commit, &impact, diff.as_deref(), self.rng.as_mut())
                .await;

            if let Some(min) = self.config.min_confidence {
                if synthesis.achievement.confidence < min {
                    debug!(
                        commit = commit.short_hash(),
                        confidence = synthesis.achievement.confidence,
                        "Achievement below confidence threshold"
                    );
                    below_threshold += 1;
                    continue;
                }
            }

            entries.push(AchievementEntry::new(
                commit,
                impact,
                synthesis.achievement,
                synthesis.reference,
            ));
        }

        info!(
            kept = entries.len(),
            sampled_out, below_threshold, "Pipeline finished"
        );

        Ok(AchievementReport::new(entries))
    }
}
