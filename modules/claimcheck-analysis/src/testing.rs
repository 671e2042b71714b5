// Test doubles for the analysis pipeline.
//
// - MockOracle (TextGenerator): scripted replies and failures, consumed in order;
//   records every prompt and its generation options.
// - MemoryStore from crate::store covers the roster and history seams.

use std::collections::VecDeque;
use std::sync::Mutex;

use ai_client::{AiError, GenerationOptions, TextGenerator};
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// MockOracle
// ---------------------------------------------------------------------------

/// Scripted oracle. Each `generate` call pops the next scripted outcome; an
/// exhausted script fails with `AiError::EmptyResponse`.
/// Builder pattern: `.reply()`, `.fail()`.
#[derive(Default)]
pub struct MockOracle {
    script: Mutex<VecDeque<Result<String, AiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub options: GenerationOptions,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    pub fn fail(self, error: AiError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, outcome: Result<String, AiError>) {
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(outcome);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock calls lock poisoned").clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().expect("mock script lock poisoned").len()
    }
}

#[async_trait]
impl TextGenerator for MockOracle {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, AiError> {
        self.calls
            .lock()
            .expect("mock calls lock poisoned")
            .push(RecordedCall {
                prompt: prompt.to_string(),
                options: options.clone(),
            });
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .pop_front()
            .unwrap_or(Err(AiError::EmptyResponse))
    }
}

// ---------------------------------------------------------------------------
// Canned oracle payloads
// ---------------------------------------------------------------------------

/// One claim object in the shape the extraction prompt asks for.
pub fn claim_json(text: &str, score: f64) -> String {
    format!(
        r#"{{"claim": "{text}", "category": "Nutrition", "source": "Podcast", "date": "2024-03-01", "verificationStatus": "Questionable", "journalsVerified": [], "journalsQuestioned": ["Nature"], "journalsDebunked": [], "score": {score}}}"#
    )
}

/// A complete, fenced claims array.
pub fn claims_response(texts: &[&str]) -> String {
    let objects: Vec<String> = texts.iter().map(|t| claim_json(t, 0.6)).collect();
    format!("```json\n[\n{}\n]\n```", objects.join(",\n"))
}

/// A recognized-subject verification reply.
pub fn recognized_response(handle: &str, main_name: &str, aliases: &[&str]) -> String {
    let aliases: Vec<String> = aliases.iter().map(|a| format!("\"{a}\"")).collect();
    format!(
        r#"Here is the result:
{{
  "isHealthInfluencer": true,
  "details": {{
    "handle": "{handle}",
    "mainName": "{main_name}",
    "description": "Physician sharing evidence-based health advice.",
    "aliases": [{}],
    "contentTags": ["nutrition", "sleep", "fitness", "longevity", "hormones", "stress", "gut-health", "supplements", "metabolism", "recovery"],
    "yearlyRevenueUsd": 1200000,
    "totalFollowers": 850000
  }}
}}"#,
        aliases.join(", ")
    )
}
