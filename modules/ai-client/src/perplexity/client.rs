use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::error::AiError;
use crate::util::truncate_to_char_boundary;

use super::types::*;

const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai";

pub(crate) struct PerplexityClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl PerplexityClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: PERPLEXITY_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap, AiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| AiError::Config(format!("invalid API key header: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AiError> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            model = %request.model,
            max_tokens = ?request.max_tokens,
            "Perplexity chat request"
        );

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        debug!(
            status = status.as_u16(),
            body = truncate_to_char_boundary(&body, 2_000),
            "Perplexity raw response"
        );

        if !status.is_success() {
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
