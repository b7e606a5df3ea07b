//! Pull/merge-request references embedded in commit messages.

use serde::{Deserialize, Serialize};

pub mod extract;
pub mod platform;
pub mod resolver;

pub use extract::{extract_reference_number, is_message_helpful};
pub use platform::{ReferenceError, ReferencePlatform, RepositoryPlatform};
pub use resolver::{ReferenceResolver, ResolverConfig};

/// A pull/merge-request reference, resolved as far as was possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceInfo {
    /// Reference number as written in the commit message.
    pub number: u64,
    /// Pull/merge-request title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Pull/merge-request description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Canonical web URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ReferenceInfo {
    /// A reference known only by its number.
    pub fn unresolved(number: u64) -> Self {
        Self {
            number,
            title: None,
            description: None,
            url: None,
        }
    }

    /// Returns the title when it carries any text.
    pub fn usable_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
