//! Comma-separated rendering (RFC 4180 quoting).

use crate::data::AchievementReport;

const HEADER: &[&str] = &[
    "date",
    "hash",
    "author",
    "impact",
    "confidence",
    "provenance",
    "data_local",
    "achievement",
    "subject",
    "reference",
];

/// Renders one header row plus one row per entry.
pub fn render(report: &AchievementReport) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER.iter().map(|h| h.to_string()));

    for entry in &report.entries {
        push_row(
            &mut out,
            [
                entry.date.to_rfc3339(),
                entry.hash.clone(),
                entry.author.clone(),
                entry.impact.tier.to_string(),
                format!("{:.2}", entry.achievement.confidence),
                entry.achievement.provenance.to_string(),
                entry.achievement.data_local.to_string(),
                entry.achievement.text.clone(),
                entry.subject.clone(),
                entry
                    .reference
                    .as_ref()
                    .map(|r| r.number.to_string())
                    .unwrap_or_default(),
            ],
        );
    }

    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().map(|f| escape(&f)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// Quotes a field when it contains a delimiter, quote or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
