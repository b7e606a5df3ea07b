//! Achievement text synthesis.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod local;
pub(crate) mod patterns;
pub mod synthesizer;

pub use synthesizer::{Synthesis, Synthesizer, SynthesizerConfig};

/// Confidence of a resolved reference title.
pub const REFERENCE_TITLE_CONFIDENCE: f64 = 0.9;
/// Confidence of the `Reference #<n>` placeholder.
pub const REFERENCE_NUMBER_CONFIDENCE: f64 = 0.7;
/// Confidence of text from a remote backend.
pub const REMOTE_BACKEND_CONFIDENCE: f64 = 0.95;
/// Confidence of text from a local backend.
pub const LOCAL_BACKEND_CONFIDENCE: f64 = 0.85;
/// Confidence of a matched local template.
pub const TEMPLATE_CONFIDENCE: f64 = 0.75;
/// Confidence of the tier-based local fallback.
pub const GENERIC_CONFIDENCE: f64 = 0.6;
/// Confidence of the raw subject fallback.
pub const RAW_SUBJECT_CONFIDENCE: f64 = 0.6;

/// How an achievement text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Built from references, templates or the commit itself.
    Pattern,
    /// Written by a generative backend.
    Backend,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern => f.write_str("pattern"),
            Self::Backend => f.write_str("backend"),
        }
    }
}

/// One synthesized achievement statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementResult {
    /// Achievement statement.
    pub text: String,
    /// Confidence in `[0, 1]`, fixed per generation path.
    pub confidence: f64,
    /// Generation path family.
    pub provenance: Provenance,
    /// False when commit data was sent off the machine.
    pub data_local: bool,
}

impl AchievementResult {
    /// Pattern-derived result; always data-local.
    pub fn pattern(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
            provenance: Provenance::Pattern,
            data_local: true,
        }
    }

    /// Backend-derived result.
    pub fn backend(text: impl Into<String>, confidence: f64, data_local: bool) -> Self {
        Self {
            text: text.into(),
            confidence,
            provenance: Provenance::Backend,
            data_local,
        }
    }
}
