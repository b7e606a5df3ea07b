//! Analyze command: runs the achievement pipeline over a commit range.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, warn};

use crate::achievement::synthesizer::DEFAULT_BACKEND_SKIP_PROBABILITY;
use crate::achievement::Synthesizer;
use crate::config::{BackendChoice, BragConfig, EnvConfig, Settings};
use crate::git::CommitFilter;
use crate::output::{render, OutputFormat};
use crate::pipeline::{Pipeline, PipelineConfig, DEFAULT_SAMPLE_RATE};
use crate::reference::{ReferenceResolver, ResolverConfig};
use crate::sampling::{RandomSource, SeededRandom};

/// Analyze command options.
#[derive(Parser)]
pub struct AnalyzeCommand {
    /// Commit range to analyze (e.g., HEAD~50..HEAD, v1.0..main).
    #[arg(value_name = "RANGE")]
    pub range: Option<String>,

    /// Only commits on or after this date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub since: Option<NaiveDate>,

    /// Only commits on or before this date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub until: Option<NaiveDate>,

    /// Only commits whose author name or email contains this text.
    #[arg(long)]
    pub author: Option<String>,

    /// Maximum number of commits to read.
    #[arg(long, value_name = "N")]
    pub max_count: Option<usize>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Keep only a random share of low-impact commits.
    #[arg(long)]
    pub sample: bool,

    /// Share of low-impact commits kept with --sample.
    #[arg(long, value_name = "RATE", default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: f64,

    /// Keep all commit data on this machine: no backend, no reference lookups.
    #[arg(long)]
    pub enterprise: bool,

    /// OpenAI API key (overrides OPENAI_API_KEY).
    #[arg(long, value_name = "KEY")]
    pub openai_key: Option<String>,

    /// Use a local Ollama model.
    #[arg(long)]
    pub ollama: bool,

    /// Ollama model name (overrides OLLAMA_MODEL).
    #[arg(long, value_name = "MODEL")]
    pub ollama_model: Option<String>,

    /// Ollama base URL (overrides OLLAMA_BASE_URL).
    #[arg(long, value_name = "URL")]
    pub ollama_url: Option<String>,

    /// GitHub token for pull request lookups (overrides GITHUB_TOKEN).
    #[arg(long, value_name = "TOKEN")]
    pub github_token: Option<String>,

    /// GitLab token for merge request lookups (overrides GITLAB_TOKEN).
    #[arg(long, value_name = "TOKEN")]
    pub gitlab_token: Option<String>,

    /// Self-hosted GitLab URL (overrides GITLAB_URL).
    #[arg(long, value_name = "URL")]
    pub gitlab_url: Option<String>,

    /// Ignore pull/merge request references in commit messages.
    #[arg(long)]
    pub no_pr_resolution: bool,

    /// Drop achievements below this confidence.
    #[arg(long, value_name = "SCORE")]
    pub min_confidence: Option<f64>,

    /// Probability of skipping the backend for a low-impact commit.
    #[arg(long, value_name = "P", default_value_t = DEFAULT_BACKEND_SKIP_PROBABILITY)]
    pub skip_probability: f64,

    /// Seed for reproducible sampling decisions.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Timeout for each backend or platform request.
    #[arg(long, value_name = "SECONDS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Repository path (defaults to the current directory).
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,
}

impl AnalyzeCommand {
    /// Executes the analyze command.
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load().unwrap_or_else(|e| {
            warn!("Ignoring settings file: {e:#}");
            Settings::default()
        });
        let config = self.resolve_config(&EnvConfig::from_settings(&settings));
        config.validate()?;

        let repo = super::open_repository(self.repo.as_deref())?;
        let remote_url = repo.remote_url("origin");

        let resolver = ReferenceResolver::from_config(
            &config.resolver_config(),
            remote_url.as_deref(),
            config.timeout,
        );
        let backend = config
            .build_backend()
            .context("Failed to create backend client")?;
        let synthesizer = Synthesizer::new(config.synthesizer_config(), resolver, backend);

        if let Some(metadata) = synthesizer.backend_metadata() {
            info!(provider = %metadata.provider, model = %metadata.model, "Using backend");
        }

        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(SeededRandom::from_seed(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        };

        let pipeline_config = PipelineConfig {
            filter: self.commit_filter(),
            sample_low_impact: config.sample_low_impact,
            sample_rate: config.sample_rate,
            min_confidence: config.min_confidence,
        };

        let mut pipeline = Pipeline::new(&repo, synthesizer, pipeline_config, rng);
        let report = pipeline.run().await?;
        let rendered = render(&report, self.format)?;

        match &self.output {
            Some(path) => {
                fs::write(path, rendered)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                info!(path = %path.display(), entries = report.entries.len(), "Report written");
            }
            None => print!("{rendered}"),
        }

        Ok(())
    }

    /// Layers command-line flags over environment values.
    fn resolve_config(&self, env: &EnvConfig) -> BragConfig {
        let merged = EnvConfig {
            openai_api_key: self.openai_key.clone().or_else(|| env.openai_api_key.clone()),
            use_ollama: self.ollama || env.use_ollama,
            ollama_model: self.ollama_model.clone().or_else(|| env.ollama_model.clone()),
            ollama_base_url: self.ollama_url.clone().or_else(|| env.ollama_base_url.clone()),
            github_token: self.github_token.clone().or_else(|| env.github_token.clone()),
            gitlab_token: self.gitlab_token.clone().or_else(|| env.gitlab_token.clone()),
            gitlab_url: self.gitlab_url.clone().or_else(|| env.gitlab_url.clone()),
            enterprise: self.enterprise || env.enterprise,
            ..env.clone()
        };

        BragConfig {
            enterprise: merged.enterprise,
            backend: BackendChoice::from_env(&merged),
            resolver: ResolverConfig {
                disabled: self.no_pr_resolution,
                offline: false,
                github_token: merged.github_token,
                github_api_url: merged.github_api_url,
                gitlab_token: merged.gitlab_token,
                gitlab_url: merged.gitlab_url,
            },
            backend_skip_probability: self.skip_probability,
            sample_low_impact: self.sample,
            sample_rate: self.sample_rate,
            min_confidence: self.min_confidence,
            seed: self.seed,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    fn commit_filter(&self) -> CommitFilter {
        CommitFilter {
            range: self.range.clone(),
            author: self.author.clone(),
            since: self.since,
            until: self.until,
            max_count: self.max_count,
            include_merges: false,
        }
    }
}
