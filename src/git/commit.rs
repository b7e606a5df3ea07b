//! Commit records produced by the git source.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use git2::{Commit, Repository};
use serde::{Deserialize, Serialize};

/// A single commit as seen by the achievement pipeline.
///
/// Records are immutable once extracted; resolved references are cached by
/// the reference resolver rather than written back here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full SHA-1 hash of the commit.
    pub hash: String,
    /// Commit author name and email address.
    pub author: String,
    /// Author timestamp with its original offset.
    pub date: DateTime<FixedOffset>,
    /// First line of the commit message.
    pub subject: String,
    /// Remainder of the commit message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Paths touched by the commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    /// Number of inserted lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insertions: Option<usize>,
    /// Number of deleted lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletions: Option<usize>,
}

impl CommitRecord {
    /// Creates a record with only the message metadata populated.
    pub fn new(
        hash: impl Into<String>,
        author: impl Into<String>,
        date: DateTime<FixedOffset>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            author: author.into(),
            date,
            subject: subject.into(),
            body: None,
            files: None,
            insertions: None,
            deletions: None,
        }
    }

    /// Sets the message body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = if body.trim().is_empty() {
            None
        } else {
            Some(body)
        };
        self
    }

    /// Sets the changed file list.
    #[must_use]
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// Sets insertion and deletion counts.
    #[must_use]
    pub fn with_stats(mut self, insertions: usize, deletions: usize) -> Self {
        self.insertions = Some(insertions);
        self.deletions = Some(deletions);
        self
    }

    /// Builds a record from a git2 commit, including file list and line stats.
    pub fn from_git_commit(repo: &Repository, commit: &Commit) -> Result<Self> {
        let hash = commit.id().to_string();

        let author = format!(
            "{} <{}>",
            commit.author().name().unwrap_or("Unknown"),
            commit.author().email().unwrap_or("unknown@example.com")
        );

        let timestamp = commit.author().when();
        let offset = FixedOffset::east_opt(timestamp.offset_minutes() * 60)
            .or_else(|| FixedOffset::east_opt(0))
            .context("Invalid commit timezone offset")?;
        let date = DateTime::from_timestamp(timestamp.seconds(), 0)
            .context("Invalid commit timestamp")?
            .with_timezone(&offset);

        let message = commit.message().unwrap_or("");
        let (subject, body) = split_message(message);

        let (files, insertions, deletions) = Self::collect_stats(repo, commit)?;

        Ok(Self {
            hash,
            author,
            date,
            subject,
            body,
            files: Some(files),
            insertions: Some(insertions),
            deletions: Some(deletions),
        })
    }

    /// Collects changed paths and line counts against the first parent.
    fn collect_stats(repo: &Repository, commit: &Commit) -> Result<(Vec<String>, usize, usize)> {
        let commit_tree = commit.tree().context("Failed to get commit tree")?;

        let parent_tree = if commit.parent_count() > 0 {
            Some(
                commit
                    .parent(0)
                    .context("Failed to get parent commit")?
                    .tree()
                    .context("Failed to get parent tree")?,
            )
        } else {
            None
        };

        // Root commits are compared against the empty tree for stats only.
        let diff = repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), None)
            .context("Failed to create diff")?;

        let files = diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .and_then(|p| p.to_str())
                    .map(str::to_string)
            })
            .collect();

        let stats = diff.stats().context("Failed to get diff stats")?;

        Ok((files, stats.insertions(), stats.deletions()))
    }

    /// Abbreviated hash for display.
    pub fn short_hash(&self) -> &str {
        super::short_hash(&self.hash)
    }

    /// Subject and body joined by a space, as used for keyword matching.
    pub fn full_text(&self) -> String {
        match &self.body {
            Some(body) => format!("{} {}", self.subject, body),
            None => self.subject.clone(),
        }
    }

    /// Changed paths, empty when unknown.
    pub fn file_list(&self) -> &[String] {
        self.files.as_deref().unwrap_or(&[])
    }

    /// Insertions plus deletions, zero when unknown.
    pub fn total_lines(&self) -> usize {
        self.insertions.unwrap_or(0) + self.deletions.unwrap_or(0)
    }
}

/// Splits a raw commit message into its subject line and optional body.
pub fn split_message(message: &str) -> (String, Option<String>) {
    let mut parts = message.splitn(2, '\n');
    let subject = parts.next().unwrap_or("").trim().to_string();
    let body = parts
        .next()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string);
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-01T10:00:00+00:00").unwrap()
    }

    #[test]
    fn split_message_subject_only() {
        let (subject, body) = split_message("Add login page\n");
        assert_eq!(subject, "Add login page");
        assert!(body.is_none());
    }

    #[test]
    fn split_message_with_body() {
        let (subject, body) = split_message("Add login page\n\nUses OAuth2 flow.\n");
        assert_eq!(subject, "Add login page");
        assert_eq!(body.as_deref(), Some("Uses OAuth2 flow."));
    }

    #[test]
    fn full_text_joins_subject_and_body() {
        let commit = CommitRecord::new("abc", "dev", date(), "fix #12").with_body("closes #13");
        assert_eq!(commit.full_text(), "fix #12 closes #13");
    }

    #[test]
    fn blank_body_is_dropped() {
        let commit = CommitRecord::new("abc", "dev", date(), "subject").with_body("   \n");
        assert!(commit.body.is_none());
    }

    #[test]
    fn missing_stats_count_as_zero() {
        let commit = CommitRecord::new("abc", "dev", date(), "subject");
        assert_eq!(commit.total_lines(), 0);
        assert!(commit.file_list().is_empty());
    }

    #[test]
    fn total_lines_sums_insertions_and_deletions() {
        let commit = CommitRecord::new("abc", "dev", date(), "subject").with_stats(40, 2);
        assert_eq!(commit.total_lines(), 42);
    }
}
