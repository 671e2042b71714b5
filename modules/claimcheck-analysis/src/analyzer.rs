//! Analysis orchestration: verify a subject, extract its claims, deduplicate,
//! and assemble the result.
//!
//! Stages run `Verifying -> Extracting -> Deduplicating -> Assembled`. Any
//! failure ends the run in `Failed`; there are no retries.

use std::sync::Arc;

use ai_client::{generate_structured, truncate_to_char_boundary, AiError, GenerationOptions, TextGenerator};
use chrono::{DateTime, Utc};
use claimcheck_common::{
    AnalysisRequest, AnalysisResult, AnalysisSettings, ClaimCheckError, OracleStage,
    SubjectDetails, SubjectVerification, CONTENT_TAG_COUNT, DESCRIPTION_MAX_CHARS,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::dedup::dedupe;
use crate::prompts::{claims_prompt, verification_prompt, VERIFICATION_SYSTEM_PROMPT};
use crate::salvage::{salvage_claims, SalvageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    Verifying,
    Extracting,
    Deduplicating,
    Assembled,
    Failed,
}

/// Everything one research run produced for a subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Research {
    pub subject: SubjectDetails,
    pub analysis: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct Analyzer {
    oracle: Arc<dyn TextGenerator>,
    settings: AnalysisSettings,
}

impl Analyzer {
    pub fn new(oracle: Arc<dyn TextGenerator>, settings: AnalysisSettings) -> Self {
        Self { oracle, settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    // ===== Verification =====

    /// Ask the oracle whether `handle` is a recognized subject.
    ///
    /// Only a recognized verification with details is returned; the details
    /// are normalized (description capped, tag count checked).
    pub async fn verify(&self, handle: &str) -> Result<SubjectVerification, ClaimCheckError> {
        info!(handle, stage = ?AnalysisStage::Verifying, "Analysis stage");

        let options = GenerationOptions::new()
            .system_prompt(VERIFICATION_SYSTEM_PROMPT)
            .max_tokens(self.settings.verification.max_tokens)
            .temperature(self.settings.verification.temperature);

        let mut verification: SubjectVerification =
            generate_structured(self.oracle.as_ref(), &verification_prompt(handle), &options)
                .await
                .map_err(|e| classify_oracle_error(e, OracleStage::Verification))?;

        if !verification.is_recognized_subject {
            let reason = verification
                .reason
                .take()
                .unwrap_or_else(|| "no reason given".to_string());
            info!(handle, reason = %reason, "Subject not recognized");
            return Err(ClaimCheckError::NotRecognized {
                handle: handle.to_string(),
                reason,
            });
        }

        let details = verification.details.as_mut().ok_or_else(|| {
            ClaimCheckError::InvariantViolation(format!(
                "verification of {handle} is recognized but carries no details"
            ))
        })?;
        normalize_details(details);

        info!(
            handle,
            primary_handle = %details.primary_handle,
            aliases = details.aliases.len(),
            "Subject verified"
        );
        Ok(verification)
    }

    // ===== Extraction =====

    /// Extract, salvage, and deduplicate claims for the request's handle.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ClaimCheckError> {
        request.validate()?;
        self.analyze_subject(&request.handle, request).await
    }

    /// Verify the subject, then analyze its claims under the verified primary handle.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<Research, ClaimCheckError> {
        request.validate()?;

        let verification = self.verify(&request.handle).await?;
        let subject = verification.details.ok_or_else(|| {
            ClaimCheckError::InvariantViolation(format!(
                "verified subject {} lost its details",
                request.handle
            ))
        })?;

        let analysis = self.analyze_subject(&subject.primary_handle, request).await?;

        Ok(Research {
            subject,
            analysis,
            notes: request.notes.clone(),
            created_at: Utc::now(),
        })
    }

    async fn analyze_subject(
        &self,
        handle: &str,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, ClaimCheckError> {
        let outcome = self.extract_and_assemble(handle, request).await;
        if let Err(e) = &outcome {
            warn!(handle, stage = ?AnalysisStage::Failed, error = %e, "Analysis failed");
        }
        outcome
    }

    async fn extract_and_assemble(
        &self,
        handle: &str,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, ClaimCheckError> {
        info!(
            handle,
            stage = ?AnalysisStage::Extracting,
            time_range = %request.time_range,
            claims_count = request.claims_count,
            "Analysis stage"
        );

        let journals = request.journal_names();
        let prompt = claims_prompt(handle, request.time_range, request.claims_count, &journals);
        let options = GenerationOptions::new()
            .max_tokens(
                request
                    .max_tokens
                    .unwrap_or(self.settings.extraction.max_tokens),
            )
            .temperature(self.settings.extraction.temperature);

        let response = self
            .oracle
            .generate(&prompt, &options)
            .await
            .map_err(|e| classify_oracle_error(e, OracleStage::Extraction))?;

        let salvaged = salvage_claims(&response).map_err(|e| match e {
            SalvageError::Truncated => ClaimCheckError::GenerationTruncated {
                stage: OracleStage::Extraction,
            },
            SalvageError::NoValidRecords { .. } => {
                error!(
                    handle,
                    raw = truncate_to_char_boundary(&response, 500),
                    "Failed to parse claims from oracle response"
                );
                ClaimCheckError::MalformedResponse(e.to_string())
            }
        })?;
        let total_found = salvaged.records.len();
        info!(
            handle,
            total_found,
            skipped = salvaged.report.candidates - salvaged.report.accepted,
            "Retrieved claims"
        );

        info!(handle, stage = ?AnalysisStage::Deduplicating, "Analysis stage");
        let unique = dedupe(salvaged.records, self.settings.dedup.batch);
        info!(handle, unique = unique.len(), total_found, "Reduced to unique claims");

        let result = AnalysisResult::assemble(
            handle,
            request.claims_count as usize,
            total_found,
            unique,
        );
        info!(
            handle,
            stage = ?AnalysisStage::Assembled,
            shortfall = result.message.is_some(),
            "Analysis stage"
        );
        Ok(result)
    }
}

fn normalize_details(details: &mut SubjectDetails) {
    let description_chars = details.description.chars().count();
    if description_chars > DESCRIPTION_MAX_CHARS {
        warn!(
            handle = %details.primary_handle,
            chars = description_chars,
            "Description too long, truncating"
        );
        details.description = details.description.chars().take(DESCRIPTION_MAX_CHARS).collect();
    }
    if details.content_tags.len() != CONTENT_TAG_COUNT {
        warn!(
            handle = %details.primary_handle,
            tags = details.content_tags.len(),
            expected = CONTENT_TAG_COUNT,
            "Unexpected content tag count"
        );
    }
}

/// Map an oracle failure to the caller-facing taxonomy for the given stage.
pub fn classify_oracle_error(err: AiError, stage: OracleStage) -> ClaimCheckError {
    match err {
        AiError::Truncated => {
            warn!(%stage, "Oracle response cut off at the token limit");
            ClaimCheckError::GenerationTruncated { stage }
        }
        AiError::Network(msg) => ClaimCheckError::UpstreamUnavailable(msg),
        err @ AiError::Api { .. } => ClaimCheckError::UpstreamUnavailable(err.to_string()),
        AiError::Config(msg) => ClaimCheckError::Config(msg),
        err @ (AiError::EmptyResponse | AiError::NoJsonObject | AiError::Parse(_)) => {
            error!(%stage, error = %err, "Malformed oracle response");
            ClaimCheckError::MalformedResponse(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{claims_response, recognized_response, MockOracle};
    use claimcheck_common::TimeRange;

    fn request(count: u32) -> AnalysisRequest {
        AnalysisRequest::builder()
            .handle("drsmith")
            .time_range(TimeRange::LastYear)
            .claims_count(count)
            .journals(vec!["Nature".to_string(), " ".to_string(), "The Lancet".to_string()])
            .build()
    }

    fn analyzer(oracle: Arc<MockOracle>) -> Analyzer {
        Analyzer::new(oracle, AnalysisSettings::default())
    }

    #[tokio::test]
    async fn verify_uses_cool_temperature_and_system_prompt() {
        let oracle = Arc::new(MockOracle::new().reply(recognized_response(
            "drsmith",
            "Jane Smith",
            &["smithmd"],
        )));
        let verification = analyzer(oracle.clone()).verify("drsmith").await.unwrap();
        assert!(verification.is_recognized_subject);

        let calls = oracle.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].options.system_prompt.as_deref(),
            Some(VERIFICATION_SYSTEM_PROMPT)
        );
        assert_eq!(calls[0].options.temperature, Some(0.3));
        assert!(calls[0].prompt.contains("\"drsmith\""));
    }

    #[tokio::test]
    async fn verify_truncates_long_description() {
        let long = "d".repeat(450);
        let reply = recognized_response("drsmith", "Jane Smith", &[]).replace(
            "Physician sharing evidence-based health advice.",
            &long,
        );
        let oracle = Arc::new(MockOracle::new().reply(reply));
        let verification = analyzer(oracle).verify("drsmith").await.unwrap();
        let details = verification.details.unwrap();
        assert_eq!(details.description.chars().count(), DESCRIPTION_MAX_CHARS);
        assert_eq!(details.content_tags.len(), CONTENT_TAG_COUNT);
    }

    #[tokio::test]
    async fn verify_keeps_unexpected_tag_count() {
        let reply = r#"{"isHealthInfluencer": true, "details": {"handle": "x", "mainName": "X", "description": "d", "aliases": [], "contentTags": ["a", "b"], "yearlyRevenueUsd": 1, "totalFollowers": 2}}"#;
        let oracle = Arc::new(MockOracle::new().reply(reply));
        let details = analyzer(oracle).verify("x").await.unwrap().details.unwrap();
        assert_eq!(details.content_tags, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn verify_reports_not_recognized() {
        let oracle = Arc::new(
            MockOracle::new().reply(r#"{"isHealthInfluencer": false, "reason": "Gaming channel"}"#),
        );
        let err = analyzer(oracle).verify("gamerguy").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Gaming channel"));
    }

    #[tokio::test]
    async fn not_recognized_keeps_caller_handle() {
        let oracle = Arc::new(MockOracle::new().reply(r#"{"isHealthInfluencer": false}"#));
        let err = analyzer(oracle).verify("HubermanLab").await.unwrap_err();
        assert_eq!(err.user_message(), "HubermanLab is not a recognized health influencer");
    }

    #[tokio::test]
    async fn verify_truncation_carries_verification_stage() {
        let oracle = Arc::new(MockOracle::new().fail(AiError::Truncated));
        let err = analyzer(oracle).verify("drsmith").await.unwrap_err();
        assert!(matches!(
            err,
            ClaimCheckError::GenerationTruncated {
                stage: OracleStage::Verification
            }
        ));
    }

    #[tokio::test]
    async fn verify_without_json_is_malformed() {
        let oracle = Arc::new(MockOracle::new().reply("I cannot help with that."));
        let err = analyzer(oracle).verify("drsmith").await.unwrap_err();
        assert!(matches!(err, ClaimCheckError::MalformedResponse(_)));
        assert!(!err.is_user_facing());
    }

    #[tokio::test]
    async fn analyze_passes_request_budget_and_clean_journals() {
        let oracle = Arc::new(MockOracle::new().reply(claims_response(&["Creatine aids memory"])));
        let mut req = request(1);
        req.max_tokens = Some(3000);

        let result = analyzer(oracle.clone()).analyze(&req).await.unwrap();
        assert_eq!(result.unique_count, 1);
        assert!(result.message.is_none());

        let call = &oracle.calls()[0];
        assert_eq!(call.options.max_tokens, Some(3000));
        assert_eq!(call.options.temperature, Some(0.7));
        assert!(call.options.system_prompt.is_none());
        assert!(call.prompt.contains("journals: Nature, The Lancet\n"));
    }

    #[tokio::test]
    async fn analyze_rejects_invalid_request_before_calling_oracle() {
        let oracle = Arc::new(MockOracle::new());
        let err = analyzer(oracle.clone()).analyze(&request(0)).await.unwrap_err();
        assert!(matches!(err, ClaimCheckError::Validation(_)));
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn no_valid_records_is_malformed() {
        let oracle = Arc::new(MockOracle::new().reply(r#"[{"claim": "incomplete"}]"#));
        let err = analyzer(oracle).analyze(&request(3)).await.unwrap_err();
        assert!(matches!(err, ClaimCheckError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn provider_errors_are_upstream_unavailable() {
        let oracle = Arc::new(MockOracle::new().fail(AiError::Api {
            status: 503,
            body: "overloaded".into(),
        }));
        let err = analyzer(oracle).analyze(&request(3)).await.unwrap_err();
        assert!(matches!(err, ClaimCheckError::UpstreamUnavailable(msg) if msg.contains("503")));
    }

    #[test]
    fn classify_maps_every_oracle_error() {
        let stage = OracleStage::Extraction;
        assert!(matches!(
            classify_oracle_error(AiError::Network("reset".into()), stage),
            ClaimCheckError::UpstreamUnavailable(_)
        ));
        assert!(matches!(
            classify_oracle_error(AiError::Config("no key".into()), stage),
            ClaimCheckError::Config(_)
        ));
        assert!(matches!(
            classify_oracle_error(AiError::EmptyResponse, stage),
            ClaimCheckError::MalformedResponse(_)
        ));
        assert!(matches!(
            classify_oracle_error(AiError::Parse("eof".into()), stage),
            ClaimCheckError::MalformedResponse(_)
        ));
    }
}
