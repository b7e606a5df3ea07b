//! Ordered fallback chain turning one commit into one achievement.

use tracing::{debug, info, warn};

use super::local::synthesize_local;
use super::{
    AchievementResult, LOCAL_BACKEND_CONFIDENCE, RAW_SUBJECT_CONFIDENCE,
    REFERENCE_NUMBER_CONFIDENCE, REFERENCE_TITLE_CONFIDENCE, REMOTE_BACKEND_CONFIDENCE,
};
use crate::backend::prompts::{clean_response, generate_user_prompt, truncate_chars, SYSTEM_PROMPT};
use crate::backend::{BackendKind, BackendMetadata, GenerativeBackend};
use crate::git::CommitRecord;
use crate::impact::{ImpactAssessment, ImpactTier};
use crate::reference::{extract_reference_number, ReferenceInfo, ReferenceResolver};
use crate::sampling::{chance, RandomSource};

/// Default probability of skipping the backend for a low-impact commit.
pub const DEFAULT_BACKEND_SKIP_PROBABILITY: f64 = 0.5;

/// Maximum characters kept from the subject in the last-resort path.
pub const RAW_SUBJECT_MAX_CHARS: usize = 60;

/// Synthesizer behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesizerConfig {
    /// Never send commit data to a backend.
    pub enterprise: bool,
    /// Probability in `[0, 1]` of skipping the backend for low-impact commits.
    pub backend_skip_probability: f64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            enterprise: false,
            backend_skip_probability: DEFAULT_BACKEND_SKIP_PROBABILITY,
        }
    }
}

/// Achievement plus the reference that was used or spotted for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// Winning strategy's result.
    pub achievement: AchievementResult,
    /// Reference used for the text, or spotted in the message.
    pub reference: Option<ReferenceInfo>,
}

/// Generation strategies, tried in order until one yields text.
///
/// The raw subject is the terminal fallback and is not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Reference,
    Backend,
    LocalPatterns,
}

const STRATEGIES: [Strategy; 3] = [
    Strategy::Reference,
    Strategy::Backend,
    Strategy::LocalPatterns,
];

/// Produces one [`AchievementResult`] per commit.
pub struct Synthesizer {
    config: SynthesizerConfig,
    resolver: ReferenceResolver,
    backend: Option<Box<dyn GenerativeBackend>>,
}

impl Synthesizer {
    /// Creates a synthesizer. In enterprise mode the backend is kept but
    /// never called.
    pub fn new(
        config: SynthesizerConfig,
        resolver: ReferenceResolver,
        backend: Option<Box<dyn GenerativeBackend>>,
    ) -> Self {
        if config.enterprise && backend.is_some() {
            warn!("Enterprise mode is on; the configured backend will not be used");
        }
        Self {
            config,
            resolver,
            backend,
        }
    }

    /// Metadata of the backend that may be called, if any.
    pub fn backend_metadata(&self) -> Option<BackendMetadata> {
        if self.config.enterprise {
            return None;
        }
        self.backend.as_ref().map(|b| b.get_metadata())
    }

    /// Runs the strategy chain for one commit. Never fails.
    pub async fn synthesize(
        &mut self,
        commit: &CommitRecord,
        assessment: &ImpactAssessment,
        diff: Option<&str>,
        rng: &mut dyn RandomSource,
    ) -> Synthesis {
        let mut reference = None;

        for strategy in STRATEGIES {
            let result = match strategy {
                Strategy::Reference => self.from_reference(commit, &mut reference).await,
                Strategy::Backend => self.from_backend(commit, assessment, diff, rng).await,
                Strategy::LocalPatterns => synthesize_local(commit, assessment, diff),
            };

            match result {
                Some(achievement) => {
                    debug!(
                        commit = commit.short_hash(),
                        ?strategy,
                        confidence = achievement.confidence,
                        "Achievement synthesized"
                    );
                    return Synthesis {
                        achievement,
                        reference: reference.or_else(|| self.spotted_reference(commit)),
                    };
                }
                None => debug!(commit = commit.short_hash(), ?strategy, "No result, falling back"),
            }
        }

        Synthesis {
            achievement: AchievementResult::pattern(
                truncate_chars(commit.subject.trim(), RAW_SUBJECT_MAX_CHARS),
                RAW_SUBJECT_CONFIDENCE,
            ),
            reference: reference.or_else(|| self.spotted_reference(commit)),
        }
    }

    async fn from_reference(
        &mut self,
        commit: &CommitRecord,
        reference: &mut Option<ReferenceInfo>,
    ) -> Option<AchievementResult> {
        if !self.resolver.should_use_reference(commit) {
            return None;
        }

        let info = self.resolver.get_reference_info(commit).await?;
        let result = match info.usable_title() {
            Some(title) => AchievementResult::pattern(title, REFERENCE_TITLE_CONFIDENCE),
            None => AchievementResult::pattern(
                format!("Reference #{}", info.number),
                REFERENCE_NUMBER_CONFIDENCE,
            ),
        };
        *reference = Some(info);
        Some(result)
    }

    async fn from_backend(
        &self,
        commit: &CommitRecord,
        assessment: &ImpactAssessment,
        diff: Option<&str>,
        rng: &mut dyn RandomSource,
    ) -> Option<AchievementResult> {
        if self.config.enterprise {
            return None;
        }
        let backend = self.backend.as_ref()?;

        if assessment.tier == ImpactTier::Low
            && chance(rng, self.config.backend_skip_probability)
        {
            debug!(commit = commit.short_hash(), "Low-impact commit skipped for backend");
            return None;
        }

        let metadata = backend.get_metadata();
        let prompt = generate_user_prompt(commit, assessment, diff);
        info!(
            commit = commit.short_hash(),
            provider = %metadata.provider,
            model = %metadata.model,
            "Requesting achievement from backend"
        );

        let raw = match backend.send_request(SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(provider = %metadata.provider, "Backend request failed: {e}");
                return None;
            }
        };

        let Some(text) = clean_response(&raw) else {
            debug!(provider = %metadata.provider, "Backend returned no usable text");
            return None;
        };

        let result = match metadata.kind {
            BackendKind::Remote => AchievementResult::backend(text, REMOTE_BACKEND_CONFIDENCE, false),
            BackendKind::Local => AchievementResult::backend(text, LOCAL_BACKEND_CONFIDENCE, true),
        };
        Some(result)
    }

    /// Number-only reference for commits whose message was good enough.
    fn spotted_reference(&self, commit: &CommitRecord) -> Option<ReferenceInfo> {
        if !self.resolver.is_enabled() {
            return None;
        }
        extract_reference_number(&commit.full_text()).map(ReferenceInfo::unresolved)
    }
}
