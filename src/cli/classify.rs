//! Classify command: prints one commit's impact assessment as YAML.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::debug;

use crate::data::to_yaml;
use crate::git::CommitSource;
use crate::impact::{classify, ImpactAssessment};

/// Classify command options.
#[derive(Parser)]
pub struct ClassifyCommand {
    /// Commit to classify.
    #[arg(value_name = "COMMIT", default_value = "HEAD")]
    pub commit: String,

    /// Repository path (defaults to the current directory).
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,
}

/// YAML document printed by the command.
#[derive(Serialize)]
struct ClassifyView<'a> {
    commit: &'a str,
    subject: &'a str,
    impact: &'a ImpactAssessment,
}

impl ClassifyCommand {
    /// Executes the classify command.
    pub fn execute(self) -> Result<()> {
        let repo = super::open_repository(self.repo.as_deref())?;
        let record = repo.get_commit(&self.commit)?;

        let diff = match repo.diff_text(&record.hash) {
            Ok(diff) => Some(diff),
            Err(e) => {
                debug!(commit = record.short_hash(), "Diff unavailable: {e}");
                None
            }
        };

        let assessment = classify(&record, diff.as_deref());
        let view = ClassifyView {
            commit: &record.hash,
            subject: &record.subject,
            impact: &assessment,
        };

        print!("{}", to_yaml(&view)?);
        Ok(())
    }
}
