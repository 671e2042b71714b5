use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AiError;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant that analyzes health-related content.";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

// =============================================================================
// Generation Options
// =============================================================================

/// Per-call generation parameters. Unset fields fall back to the provider defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn resolved_system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn resolved_max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn resolved_temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

// =============================================================================
// TextGenerator Trait
// =============================================================================

/// A text-generation oracle: one prompt in, generated text out.
///
/// Implementations make at most one attempt per call. A provider-reported
/// early stop must surface as [`AiError::Truncated`], never as partial text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, AiError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, AiError> {
        (**self).generate(prompt, options).await
    }
}
