//! Git commit extraction and diff retrieval.

use anyhow::Result;

pub mod commit;
pub mod repository;

pub use commit::CommitRecord;
pub use repository::{CommitFilter, GitRepository};

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;

/// Source of commit records and their diffs.
///
/// The pipeline only talks to git through this trait so that it can be driven
/// by in-memory fixtures in tests.
pub trait CommitSource {
    /// Lists the commits selected by `filter`, newest first.
    fn list_commits(&self, filter: &CommitFilter) -> Result<Vec<CommitRecord>>;

    /// Returns the unified diff introduced by the commit.
    ///
    /// Fails for commits whose diff cannot be produced (e.g. a root commit
    /// has no parent); callers treat that as an empty diff.
    fn diff_text(&self, hash: &str) -> Result<String>;
}

/// Truncates a commit hash to [`SHORT_HASH_LEN`] characters.
pub fn short_hash(hash: &str) -> &str {
    if hash.len() > SHORT_HASH_LEN {
        &hash[..SHORT_HASH_LEN]
    } else {
        hash
    }
}
