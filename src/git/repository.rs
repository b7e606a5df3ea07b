//! Git repository operations.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use git2::{Oid, Repository, Sort};
use tracing::debug;

use crate::git::{CommitRecord, CommitSource};

/// Selection criteria for the commits to analyze.
#[derive(Debug, Clone, Default)]
pub struct CommitFilter {
    /// Commit range (e.g. `HEAD~20..HEAD`, `v1.0..main`) or single revision to
    /// start walking from. Defaults to the full history of `HEAD`.
    pub range: Option<String>,
    /// Case-insensitive substring matched against the author name and email.
    pub author: Option<String>,
    /// Only commits authored on or after this date.
    pub since: Option<NaiveDate>,
    /// Only commits authored on or before this date.
    pub until: Option<NaiveDate>,
    /// Maximum number of commits to return.
    pub max_count: Option<usize>,
    /// Whether merge commits are included.
    pub include_merges: bool,
}

impl CommitFilter {
    /// Returns true when the commit passes the author and date filters.
    fn accepts(&self, record: &CommitRecord) -> bool {
        if let Some(author) = &self.author {
            if !record
                .author
                .to_lowercase()
                .contains(&author.to_lowercase())
            {
                return false;
            }
        }

        let day = record.date.date_naive();
        if self.since.is_some_and(|since| day < since) {
            return false;
        }
        if self.until.is_some_and(|until| day > until) {
            return false;
        }

        true
    }
}

/// Git repository wrapper.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Opens the repository containing the current directory.
    pub fn open() -> Result<Self> {
        let repo = Repository::discover(".").context("Not in a git repository")?;

        Ok(Self { repo })
    }

    /// Opens the repository at the specified path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;

        Ok(Self { repo })
    }

    /// Returns the URL configured for the named remote, if any.
    pub fn remote_url(&self, name: &str) -> Option<String> {
        match self.repo.find_remote(name) {
            Ok(remote) => remote.url().map(str::to_string),
            Err(e) => {
                debug!(remote = name, error = %e, "Remote not available");
                None
            }
        }
    }

    /// Resolves a single revision to a commit record.
    pub fn get_commit(&self, revision: &str) -> Result<CommitRecord> {
        let commit = self
            .repo
            .revparse_single(revision)
            .with_context(|| format!("Failed to parse commit: {revision}"))?
            .peel_to_commit()
            .context("Failed to peel object to commit")?;
        CommitRecord::from_git_commit(&self.repo, &commit)
    }

    /// Sets up a revwalk for a range (`a..b`) or single starting revision.
    fn walk_start(&self, range: Option<&str>) -> Result<git2::Revwalk<'_>> {
        let mut walker = self.repo.revwalk().context("Failed to create revwalk")?;
        walker
            .set_sorting(Sort::TIME)
            .context("Failed to set revwalk sorting")?;

        match range {
            Some(range) if range.contains("..") => {
                let (start_spec, end_spec) = range
                    .split_once("..")
                    .with_context(|| format!("Invalid range format: {range}"))?;
                let end_spec = if end_spec.is_empty() { "HEAD" } else { end_spec };

                let start = self.peel_to_oid(start_spec)?;
                let end = self.peel_to_oid(end_spec)?;

                walker.push(end).context("Failed to push end commit")?;
                walker.hide(start).context("Failed to hide start commit")?;
            }
            Some(revision) => {
                let oid = self.peel_to_oid(revision)?;
                walker.push(oid).context("Failed to push start commit")?;
            }
            None => {
                walker.push_head().context("Failed to push HEAD")?;
            }
        }

        Ok(walker)
    }

    fn peel_to_oid(&self, spec: &str) -> Result<Oid> {
        let commit = self
            .repo
            .revparse_single(spec)
            .with_context(|| format!("Failed to parse commit: {spec}"))?
            .peel_to_commit()
            .with_context(|| format!("Failed to peel {spec} to commit"))?;
        Ok(commit.id())
    }
}

impl CommitSource for GitRepository {
    fn list_commits(&self, filter: &CommitFilter) -> Result<Vec<CommitRecord>> {
        let walker = self.walk_start(filter.range.as_deref())?;
        let mut commits = Vec::new();

        for oid in walker {
            if filter.max_count.is_some_and(|max| commits.len() >= max) {
                break;
            }

            let oid = oid.context("Failed to get commit OID from walker")?;
            let commit = self
                .repo
                .find_commit(oid)
                .context("Failed to find commit")?;

            if !filter.include_merges && commit.parent_count() > 1 {
                continue;
            }

            let record = CommitRecord::from_git_commit(&self.repo, &commit)?;
            if filter.accepts(&record) {
                commits.push(record);
            }
        }

        debug!(count = commits.len(), "Collected commits");
        Ok(commits)
    }

    fn diff_text(&self, hash: &str) -> Result<String> {
        let oid = Oid::from_str(hash).with_context(|| format!("Invalid commit hash: {hash}"))?;
        let commit = self
            .repo
            .find_commit(oid)
            .with_context(|| format!("Failed to find commit: {hash}"))?;

        if commit.parent_count() == 0 {
            anyhow::bail!("Commit {hash} has no parent");
        }

        let commit_tree = commit.tree().context("Failed to get commit tree")?;
        let parent_tree = commit
            .parent(0)
            .context("Failed to get parent commit")?
            .tree()
            .context("Failed to get parent tree")?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), None)
            .context("Failed to create diff")?;

        let mut diff_content = String::new();
        diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            let content = std::str::from_utf8(line.content()).unwrap_or("<binary>");
            match line.origin() {
                '+' | '-' | ' ' => diff_content.push(line.origin()),
                _ => {}
            }
            diff_content.push_str(content);
            true
        })
        .context("Failed to format diff")?;

        Ok(diff_content)
    }
}
