//! CLI interface for git-brag.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::git::GitRepository;

pub mod analyze;
pub mod classify;

/// git-brag: turns git history into resume-ready achievements.
#[derive(Parser)]
#[command(name = "git-brag")]
#[command(about = "Turns git history into resume-ready achievements", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Analyzes commits and writes an achievement report.
    Analyze(analyze::AnalyzeCommand),
    /// Prints the impact assessment of a single commit as YAML.
    Classify(classify::ClassifyCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Analyze(cmd) => cmd.execute().await,
            Commands::Classify(cmd) => cmd.execute(),
        }
    }
}

/// Opens the repository at `path`, or the one containing the current
/// directory.
fn open_repository(path: Option<&Path>) -> Result<GitRepository> {
    match path {
        Some(path) => GitRepository::open_at(path)
            .with_context(|| format!("Failed to open git repository at {}", path.display())),
        None => GitRepository::open()
            .context("Failed to open git repository. Make sure you're in a git repository."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_classify_default_commit() {
        let cli = Cli::try_parse_from(["git-brag", "classify"]).unwrap();
        match cli.command {
            Commands::Classify(cmd) => assert_eq!(cmd.commit, "HEAD"),
            Commands::Analyze(_) => panic!("expected classify"),
        }
    }

    #[test]
    fn unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["git-brag", "brag"]).is_err());
    }
}
