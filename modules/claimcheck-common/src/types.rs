use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Maximum length of a subject description, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 400;

/// Number of content tags a verified subject is expected to carry.
pub const CONTENT_TAG_COUNT: usize = 10;

// --- Claim enums ---

/// Topic a claim falls under. Unknown labels are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClaimCategory {
    Nutrition,
    Medicine,
    MentalHealth,
    Fitness,
    AlternativeMedicine,
    GeneralWellness,
    Other(String),
}

impl ClaimCategory {
    pub const KNOWN: [ClaimCategory; 6] = [
        ClaimCategory::Nutrition,
        ClaimCategory::Medicine,
        ClaimCategory::MentalHealth,
        ClaimCategory::Fitness,
        ClaimCategory::AlternativeMedicine,
        ClaimCategory::GeneralWellness,
    ];

    pub fn label(&self) -> &str {
        match self {
            ClaimCategory::Nutrition => "Nutrition",
            ClaimCategory::Medicine => "Medicine",
            ClaimCategory::MentalHealth => "Mental Health",
            ClaimCategory::Fitness => "Fitness",
            ClaimCategory::AlternativeMedicine => "Alternative Medicine",
            ClaimCategory::GeneralWellness => "General Wellness",
            ClaimCategory::Other(label) => label,
        }
    }
}

impl From<String> for ClaimCategory {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        Self::KNOWN
            .into_iter()
            .find(|known| known.label().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| ClaimCategory::Other(trimmed.to_string()))
    }
}

impl From<ClaimCategory> for String {
    fn from(category: ClaimCategory) -> Self {
        category.label().to_string()
    }
}

impl fmt::Display for ClaimCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Consensus verdict for a claim against the reference sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VerificationStatus {
    Verified,
    Questionable,
    Debunked,
    Other(String),
}

impl VerificationStatus {
    pub fn label(&self) -> &str {
        match self {
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Questionable => "Questionable",
            VerificationStatus::Debunked => "Debunked",
            VerificationStatus::Other(label) => label,
        }
    }
}

impl From<String> for VerificationStatus {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "verified" => VerificationStatus::Verified,
            "questionable" => VerificationStatus::Questionable,
            "debunked" => VerificationStatus::Debunked,
            _ => VerificationStatus::Other(trimmed.to_string()),
        }
    }
}

impl From<VerificationStatus> for String {
    fn from(status: VerificationStatus) -> Self {
        status.label().to_string()
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// --- Claims ---

/// A single normalized claim. `source` already carries the claim date in
/// parentheses, e.g. `"Podcast episode (2024-03-01)"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    pub text: String,
    pub category: ClaimCategory,
    pub source: String,
    pub verification_status: VerificationStatus,
    pub journals_verified: Vec<String>,
    pub journals_questioned: Vec<String>,
    pub journals_debunked: Vec<String>,
    /// Credibility in [0, 1].
    pub score: f64,
}

/// A claim already persisted for a subject, as supplied by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredClaim {
    pub id: i64,
    pub subject_id: i64,
    pub text: String,
    pub score: f64,
    pub first_detected_at: DateTime<Utc>,
}

/// Outcome of one extraction run for a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub subject: String,
    pub requested_count: usize,
    pub total_found: usize,
    pub unique_count: usize,
    pub claims: Vec<ClaimRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnalysisResult {
    /// Build a result from the deduplicated claims, attaching a shortfall
    /// message when fewer unique claims were found than requested.
    pub fn assemble(
        subject: impl Into<String>,
        requested_count: usize,
        total_found: usize,
        claims: Vec<ClaimRecord>,
    ) -> Self {
        let unique_count = claims.len();
        let message = (unique_count < requested_count).then(|| {
            format!(
                "Could not find {requested_count} claims in the given timeframe, however we found {unique_count} claims and successfully created the research"
            )
        });

        Self {
            subject: subject.into(),
            requested_count,
            total_found,
            unique_count,
            claims,
            message,
        }
    }
}

// --- Subject identity ---

/// The oracle's verdict on whether a handle denotes a recognized subject.
///
/// `details` is expected iff `is_recognized_subject`; the verifier enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectVerification {
    #[serde(rename = "isHealthInfluencer", alias = "isRecognizedSubject")]
    pub is_recognized_subject: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<SubjectDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDetails {
    #[serde(rename = "handle", alias = "primaryHandle")]
    pub primary_handle: String,
    pub main_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub content_tags: Vec<String>,
    #[serde(default, deserialize_with = "integer_from_number")]
    pub yearly_revenue_usd: i64,
    #[serde(default, deserialize_with = "integer_from_number")]
    pub total_followers: i64,
}

/// Minimal projection of a stored identity, as supplied by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingIdentity {
    pub id: i64,
    pub handle: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: i64,
    pub handle: String,
}

/// Models often emit `5000000.0` or `4.2e6` where an integer was asked for.
fn integer_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(i) = number.as_i64() {
        return Ok(i);
    }
    if let Some(u) = number.as_u64() {
        return Ok(i64::try_from(u).unwrap_or(i64::MAX));
    }
    number
        .as_f64()
        .filter(|f| f.is_finite())
        .map(|f| f.round() as i64)
        .ok_or_else(|| de::Error::custom(format!("expected an integer, got {number}")))
}
