use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Response was cut off due to max_tokens limit")]
    Truncated,

    #[error("No valid JSON object found in the response")]
    NoJsonObject,

    #[error("Provider returned no message content")]
    EmptyResponse,
}

impl AiError {
    /// True when the provider stopped generating because it hit the token limit.
    pub fn is_truncated(&self) -> bool {
        matches!(self, AiError::Truncated)
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        AiError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for AiError {
    fn from(e: serde_json::Error) -> Self {
        AiError::Parse(e.to_string())
    }
}
