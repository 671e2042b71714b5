use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ClaimCheckError;

pub const DEFAULT_PERPLEXITY_MODEL: &str = "llama-3.1-sonar-small-128k-online";

/// Application configuration loaded from environment variables.
/// Secrets stay in the environment; tunables live in the optional TOML file.
#[derive(Debug, Clone)]
pub struct Config {
    pub perplexity_api_key: String,
    pub perplexity_model: String,
    pub perplexity_base_url: Option<String>,
    pub settings_path: Option<PathBuf>,
    pub settings: AnalysisSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ClaimCheckError> {
        dotenvy::dotenv().ok();

        let perplexity_api_key = env::var("PERPLEXITY_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                ClaimCheckError::Config("PERPLEXITY_API_KEY environment variable is required".into())
            })?;

        let settings_path = env::var("CLAIMCHECK_CONFIG").ok().map(PathBuf::from);
        let settings = match &settings_path {
            Some(path) => AnalysisSettings::load(path)?,
            None => AnalysisSettings::default(),
        };

        let config = Self {
            perplexity_api_key,
            perplexity_model: env::var("PERPLEXITY_MODEL")
                .unwrap_or_else(|_| DEFAULT_PERPLEXITY_MODEL.to_string()),
            perplexity_base_url: env::var("PERPLEXITY_BASE_URL").ok(),
            settings_path,
            settings,
        };

        config.log_redacted();
        Ok(config)
    }

    pub fn log_redacted(&self) {
        fn preview(val: &str) -> String {
            let head: String = val.chars().take(5).collect();
            format!("{}...({} chars)", head, val.chars().count())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  PERPLEXITY_API_KEY: {}", preview(&self.perplexity_api_key));
        tracing::info!("  PERPLEXITY_MODEL: {}", self.perplexity_model);
        tracing::info!(
            "  PERPLEXITY_BASE_URL: {}",
            self.perplexity_base_url.as_deref().unwrap_or("<default>")
        );
        tracing::info!(
            "  CLAIMCHECK_CONFIG: {}",
            self.settings_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<defaults>".to_string())
        );
    }
}

// --- TOML settings ---

/// Tunables for the analysis pipeline, loaded from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisSettings {
    pub dedup: DedupThresholds,
    pub verification: GenerationSettings,
    pub extraction: GenerationSettings,
}

/// Similarity thresholds at which two claim texts count as the same claim.
///
/// `batch` applies within one extraction run, `history` against claims already
/// stored for the subject. They are kept separate on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DedupThresholds {
    pub batch: f64,
    pub history: f64,
}

impl Default for DedupThresholds {
    fn default() -> Self {
        Self {
            batch: 0.75,
            history: 0.85,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

impl Default for AnalysisSettings {
    /// Identity verification runs cooler than extraction.
    fn default() -> Self {
        Self {
            dedup: DedupThresholds::default(),
            verification: GenerationSettings {
                temperature: 0.3,
                ..GenerationSettings::default()
            },
            extraction: GenerationSettings::default(),
        }
    }
}

impl AnalysisSettings {
    pub fn load(path: &Path) -> Result<Self, ClaimCheckError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClaimCheckError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            ClaimCheckError::Config(msg) => {
                ClaimCheckError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ClaimCheckError> {
        let settings: AnalysisSettings = toml::from_str(content)
            .map_err(|e| ClaimCheckError::Config(format!("Failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ClaimCheckError> {
        for (name, value) in [
            ("dedup.batch", self.dedup.batch),
            ("dedup.history", self.dedup.history),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ClaimCheckError::Config(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        for (name, generation) in [
            ("verification", &self.verification),
            ("extraction", &self.extraction),
        ] {
            if generation.max_tokens == 0 {
                return Err(ClaimCheckError::Config(format!(
                    "{name}.max_tokens must be positive"
                )));
            }
            if !(0.0..=2.0).contains(&generation.temperature) {
                return Err(ClaimCheckError::Config(format!(
                    "{name}.temperature must be in [0, 2], got {}",
                    generation.temperature
                )));
            }
        }
        Ok(())
    }
}
