//! JSON rendering.

use anyhow::{Context, Result};

use crate::data::AchievementReport;

/// Renders the report as pretty-printed JSON.
pub fn render(report: &AchievementReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

/// Parses a report previously written by [`render`].
pub fn parse(text: &str) -> Result<AchievementReport> {
    serde_json::from_str(text).context("Failed to parse report JSON")
}
