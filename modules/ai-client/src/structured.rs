use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AiError;
use crate::traits::{GenerationOptions, TextGenerator};
use crate::util::{json_object_span, strip_code_blocks, truncate_to_char_boundary};

/// Generate text and deserialize the JSON object embedded in it.
///
/// Truncation from the underlying call passes through untouched so callers can
/// tell "cut off" apart from "no parseable object".
pub async fn generate_structured<T, G>(
    generator: &G,
    prompt: &str,
    options: &GenerationOptions,
) -> Result<T, AiError>
where
    T: DeserializeOwned,
    G: TextGenerator + ?Sized,
{
    let response = generator.generate(prompt, options).await?;
    parse_structured(&response)
}

/// Best-effort extraction of a single JSON object from free text.
pub fn parse_structured<T: DeserializeOwned>(response: &str) -> Result<T, AiError> {
    let cleaned = strip_code_blocks(response);
    let span = json_object_span(&cleaned).ok_or(AiError::NoJsonObject)?;

    serde_json::from_str(span).map_err(|e| {
        warn!(
            error = %e,
            preview = truncate_to_char_boundary(span, 500),
            "Failed to parse JSON response"
        );
        AiError::Parse(e.to_string())
    })
}
