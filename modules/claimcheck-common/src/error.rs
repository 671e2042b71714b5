use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Which oracle interaction a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleStage {
    Verification,
    Extraction,
}

impl OracleStage {
    /// What the caller can change to get a complete response next time.
    pub fn remediation(&self) -> &'static str {
        match self {
            OracleStage::Verification => "Consider increasing max_tokens for the verification.",
            OracleStage::Extraction => {
                "Consider increasing max_tokens or reducing the number of claims."
            }
        }
    }
}

impl fmt::Display for OracleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleStage::Verification => f.write_str("verification"),
            OracleStage::Extraction => f.write_str("extraction"),
        }
    }
}

const GENERIC_FAILURE: &str = "The analysis could not be completed. Please try again later.";

#[derive(Error, Debug)]
pub enum ClaimCheckError {
    #[error("{handle} is not a recognized health influencer: {reason}")]
    NotRecognized { handle: String, reason: String },

    #[error("Response was cut off due to max_tokens limit during {stage}. {}", .stage.remediation())]
    GenerationTruncated { stage: OracleStage },

    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Oracle unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClaimCheckError {
    /// Errors whose message is safe and useful to show an end user as-is.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ClaimCheckError::NotRecognized { .. }
                | ClaimCheckError::GenerationTruncated { .. }
                | ClaimCheckError::Validation(_)
        )
    }

    /// "Not found" outcomes, as opposed to technical failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClaimCheckError::NotRecognized { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            ClaimCheckError::NotRecognized { handle, .. } => {
                format!("{handle} is not a recognized health influencer")
            }
            ClaimCheckError::GenerationTruncated { .. } | ClaimCheckError::Validation(_) => {
                self.to_string()
            }
            ClaimCheckError::MalformedResponse(_)
            | ClaimCheckError::InvariantViolation(_)
            | ClaimCheckError::UpstreamUnavailable(_)
            | ClaimCheckError::Config(_) => GENERIC_FAILURE.to_string(),
        }
    }
}
