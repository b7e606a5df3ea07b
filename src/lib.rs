//! # git-brag
//!
//! Turns git commit history into resume-ready achievement statements.
//!
//! Each commit is classified by impact, checked for a pull/merge-request
//! reference, and phrased by the first generation strategy that succeeds:
//! reference title, generative backend, local pattern templates, or the raw
//! subject line.
//!
//! ## Quick Start
//!
//! ```rust
//! use git_brag::git::CommitRecord;
//! use git_brag::impact::{classify, ImpactTier};
//!
//! let date = chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00+00:00").unwrap();
//! let commit = CommitRecord::new("abc123", "Ada", date, "Rewrite scheduler")
//!     .with_files(["src/scheduler.rs"])
//!     .with_stats(600, 0);
//!
//! assert_eq!(classify(&commit, None).tier, ImpactTier::High);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod achievement;
pub mod backend;
pub mod cli;
pub mod config;
pub mod data;
pub mod git;
pub mod impact;
pub mod output;
pub mod pipeline;
pub mod reference;
pub mod sampling;

pub use crate::cli::Cli;

/// The current version of git-brag.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
