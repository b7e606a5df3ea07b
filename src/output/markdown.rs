//! Markdown rendering, one section per calendar day.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::{AchievementEntry, AchievementReport};

/// Renders the report as Markdown.
///
/// Days are taken in each commit's own offset and listed newest first.
/// Within a day, entries keep the report order.
pub fn render(report: &AchievementReport) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    out.push_str("# Achievements\n\n");
    out.push_str(&format!(
        "_Generated {} UTC from {} commits: {} high, {} medium, {} low_\n",
        report.generated_at.format("%Y-%m-%d %H:%M"),
        summary.total(),
        summary.high,
        summary.medium,
        summary.low
    ));

    let mut days: BTreeMap<NaiveDate, Vec<&AchievementEntry>> = BTreeMap::new();
    for entry in &report.entries {
        days.entry(entry.date.date_naive()).or_default().push(entry);
    }

    for (day, entries) in days.iter().rev() {
        out.push_str(&format!("\n## {}\n\n", day.format("%Y-%m-%d")));
        for entry in entries {
            render_entry(&mut out, entry);
        }
    }

    out
}

fn render_entry(out: &mut String, entry: &AchievementEntry) {
    out.push_str(&format!(
        "- {} {} (`{}`, {:.2}, {})",
        entry.impact.tier.emoji(),
        entry.achievement.text,
        entry.short_hash,
        entry.achievement.confidence,
        entry.achievement.provenance
    ));
    if let Some(reference) = &entry.reference {
        match &reference.url {
            Some(url) => out.push_str(&format!(" [#{}]({url})", reference.number)),
            None => out.push_str(&format!(" #{}", reference.number)),
        }
    }
    out.push('\n');
}
