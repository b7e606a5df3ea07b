//! Settings file, environment lookup and validated run configuration.
//!
//! Values are read from the process environment first and then from
//! `$HOME/.git-brag/settings.json`, whose `env` map mirrors environment
//! variables. Command-line flags are layered on top by the CLI.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::achievement::synthesizer::DEFAULT_BACKEND_SKIP_PROBABILITY;
use crate::achievement::SynthesizerConfig;
use crate::backend::{BackendError, GenerativeBackend, OpenAiBackend, DEFAULT_REQUEST_TIMEOUT};
use crate::pipeline::DEFAULT_SAMPLE_RATE;
use crate::reference::ResolverConfig;

/// Settings loaded from `$HOME/.git-brag/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable fallbacks.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path; a missing file yields defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Settings>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(".git-brag").join("settings.json"))
    }

    /// Returns an environment variable with fallback to settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        match env::var(key) {
            Ok(value) => Some(value),
            Err(_) => self.env.get(key).cloned(),
        }
    }
}

/// Configuration values recognised in the environment and settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// `OPENAI_API_KEY`.
    pub openai_api_key: Option<String>,
    /// `OPENAI_MODEL`.
    pub openai_model: Option<String>,
    /// `USE_OLLAMA`.
    pub use_ollama: bool,
    /// `OLLAMA_MODEL`.
    pub ollama_model: Option<String>,
    /// `OLLAMA_BASE_URL`.
    pub ollama_base_url: Option<String>,
    /// `GITHUB_TOKEN`.
    pub github_token: Option<String>,
    /// `GITHUB_API_URL`.
    pub github_api_url: Option<String>,
    /// `GITLAB_TOKEN`.
    pub gitlab_token: Option<String>,
    /// `GITLAB_URL`.
    pub gitlab_url: Option<String>,
    /// `GIT_BRAG_ENTERPRISE`.
    pub enterprise: bool,
}

impl EnvConfig {
    /// Reads every recognised variable through `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::from_lookup(|key| settings.get_env_var(key))
    }

    /// Reads every recognised variable through `lookup`. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str| get(key).is_some_and(|v| is_truthy(&v));

        Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL"),
            use_ollama: flag("USE_OLLAMA"),
            ollama_model: get("OLLAMA_MODEL"),
            ollama_base_url: get("OLLAMA_BASE_URL"),
            github_token: get("GITHUB_TOKEN"),
            github_api_url: get("GITHUB_API_URL"),
            gitlab_token: get("GITLAB_TOKEN"),
            gitlab_url: get("GITLAB_URL"),
            enterprise: flag("GIT_BRAG_ENTERPRISE"),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Rejected configurations. Raised before any commit is read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Enterprise mode together with a backend credential or flag.
    #[error("Enterprise mode forbids sending commits to a backend, but the {backend} backend is configured")]
    OfflineConflict {
        /// Name of the configured backend.
        backend: &'static str,
    },

    /// A probability outside `[0, 1]`.
    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidProbability {
        /// Option name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// A confidence threshold outside `[0, 1]`.
    #[error("Minimum confidence must be between 0 and 1, got {0}")]
    InvalidConfidence(f64),

    /// A zero request timeout.
    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Generative backend selected for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendChoice {
    /// Local pattern synthesis only.
    #[default]
    Disabled,
    /// Hosted OpenAI API.
    OpenAi {
        /// API key.
        api_key: String,
        /// Model override.
        model: Option<String>,
    },
    /// Ollama on the local machine or network.
    Ollama {
        /// Model override.
        model: Option<String>,
        /// Base URL override.
        base_url: Option<String>,
    },
}

impl BackendChoice {
    /// Picks the backend from environment values; Ollama wins over an
    /// OpenAI key when both are present.
    pub fn from_env(env: &EnvConfig) -> Self {
        if env.use_ollama {
            Self::Ollama {
                model: env.ollama_model.clone(),
                base_url: env.ollama_base_url.clone(),
            }
        } else if let Some(api_key) = &env.openai_api_key {
            Self::OpenAi {
                api_key: api_key.clone(),
                model: env.openai_model.clone(),
            }
        } else {
            Self::Disabled
        }
    }

    /// Display name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disabled => "none",
            Self::OpenAi { .. } => "OpenAI",
            Self::Ollama { .. } => "Ollama",
        }
    }
}

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct BragConfig {
    /// Keep commit data on the machine.
    pub enterprise: bool,
    /// Selected generative backend.
    pub backend: BackendChoice,
    /// Reference resolution settings.
    pub resolver: ResolverConfig,
    /// Probability of skipping the backend for low-impact commits.
    pub backend_skip_probability: f64,
    /// Drop a share of low-impact commits.
    pub sample_low_impact: bool,
    /// Probability of keeping a low-impact commit when sampling.
    pub sample_rate: f64,
    /// Minimum achievement confidence to report.
    pub min_confidence: Option<f64>,
    /// Seed for reproducible sampling.
    pub seed: Option<u64>,
    /// Timeout applied to every external request.
    pub timeout: Duration,
}

impl Default for BragConfig {
    fn default() -> Self {
        Self {
            enterprise: false,
            backend: BackendChoice::Disabled,
            resolver: ResolverConfig::default(),
            backend_skip_probability: DEFAULT_BACKEND_SKIP_PROBABILITY,
            sample_low_impact: false,
            sample_rate: DEFAULT_SAMPLE_RATE,
            min_confidence: None,
            seed: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl BragConfig {
    /// Rejects contradictory or out-of-range settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enterprise && self.backend != BackendChoice::Disabled {
            return Err(ConfigError::OfflineConflict {
                backend: self.backend.name(),
            });
        }

        for (name, value) in [
            ("Backend skip probability", self.backend_skip_probability),
            ("Sample rate", self.sample_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        if let Some(min) = self.min_confidence {
            if !(0.0..=1.0).contains(&min) {
                return Err(ConfigError::InvalidConfidence(min));
            }
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    /// Synthesizer switches derived from this configuration.
    pub fn synthesizer_config(&self) -> SynthesizerConfig {
        SynthesizerConfig {
            enterprise: self.enterprise,
            backend_skip_probability: self.backend_skip_probability,
        }
    }

    /// Resolver settings; enterprise mode forces number-only references.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            offline: self.resolver.offline || self.enterprise,
            ..self.resolver.clone()
        }
    }

    /// Builds the selected backend client, if any.
    pub fn build_backend(&self) -> Result<Option<Box<dyn GenerativeBackend>>, BackendError> {
        if self.enterprise {
            return Ok(None);
        }

        let backend: Box<dyn GenerativeBackend> = match &self.backend {
            BackendChoice::Disabled => return Ok(None),
            BackendChoice::OpenAi { api_key, model } => Box::new(OpenAiBackend::new_openai(
                model.clone(),
                api_key.clone(),
                self.timeout,
            )?),
            BackendChoice::Ollama { model, base_url } => Box::new(OpenAiBackend::new_ollama(
                model.clone(),
                base_url.clone(),
                self.timeout,
            )?),
        };
        Ok(Some(backend))
    }
}
