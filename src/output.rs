//! Report renderers.

use anyhow::Result;
use clap::ValueEnum;

use crate::data::AchievementReport;

pub mod csv;
pub mod json;
pub mod markdown;

/// Supported report formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Markdown grouped by day.
    Markdown,
    /// Comma-separated values.
    Csv,
}

/// Renders `report` in `format`.
pub fn render(report: &AchievementReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => Ok(markdown::render(report)),
        OutputFormat::Csv => Ok(csv::render(report)),
    }
}
