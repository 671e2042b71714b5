mod client;
pub(crate) mod types;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AiError;
use crate::traits::{GenerationOptions, TextGenerator};

use client::PerplexityClient;
use types::*;

pub const DEFAULT_MODEL: &str = "llama-3.1-sonar-small-128k-online";

// =============================================================================
// Perplexity Agent
// =============================================================================

/// Perplexity chat-completions oracle.
///
/// Credentials are passed in at construction; this type never reads the
/// process environment.
#[derive(Clone)]
pub struct Perplexity {
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl Perplexity {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> PerplexityClient {
        let client = PerplexityClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    fn build_request(&self, prompt: &str, options: &GenerationOptions) -> ChatRequest {
        ChatRequest::new(&self.model)
            .message(WireMessage::system(options.resolved_system_prompt()))
            .message(WireMessage::user(prompt))
            .max_tokens(options.resolved_max_tokens())
            .temperature(options.resolved_temperature())
    }
}

/// Pull the generated text out of a completion, flagging length-limited stops.
fn completion_text(response: ChatResponse) -> Result<String, AiError> {
    if let Some(usage) = &response.usage {
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Perplexity usage"
        );
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(AiError::EmptyResponse)?;

    if choice.finish_reason.as_deref() == Some("length") {
        warn!(
            content_len = choice.message.content.as_ref().map_or(0, String::len),
            "Perplexity response stopped at max_tokens"
        );
        return Err(AiError::Truncated);
    }

    match choice.message.content {
        Some(content) if !content.is_empty() => Ok(content),
        _ => Err(AiError::EmptyResponse),
    }
}

#[async_trait]
impl TextGenerator for Perplexity {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, AiError> {
        let request = self.build_request(prompt, options);
        let response = self.client().chat(&request).await?;
        completion_text(response)
    }
}
