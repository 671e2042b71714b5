//! Record salvage: pull as many valid claim records as possible out of an
//! oracle response that may be fenced, wrapped in prose, or partly malformed.
//!
//! Records are found by scanning for flat `{...}` spans. This assumes claim
//! objects contain no nested braces; a nested prompt format would need a
//! depth-tracking scanner instead.

use std::sync::LazyLock;

use ai_client::{strip_code_blocks, truncate_to_char_boundary};
use claimcheck_common::{ClaimCategory, ClaimRecord, VerificationStatus};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

static CLAIM_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}").expect("claim object pattern is valid"));

const REQUIRED_FIELDS: [&str; 9] = [
    "claim",
    "category",
    "source",
    "date",
    "verificationStatus",
    "journalsVerified",
    "journalsQuestioned",
    "journalsDebunked",
    "score",
];

const TRUNCATION_MARKERS: [&str; 2] = ["...", "…"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SalvageError {
    /// The response as a whole looks cut off. Checked before any record scanning.
    #[error("Response is incomplete or was truncated")]
    Truncated,

    #[error("No valid claims found in the response ({candidates} candidates scanned)")]
    NoValidRecords { candidates: usize },
}

/// Per-response yield counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalvageReport {
    pub candidates: usize,
    pub accepted: usize,
    /// Not valid JSON objects.
    pub unparseable: usize,
    /// Missing one or more required fields.
    pub incomplete: usize,
    /// All fields present but with unusable values.
    pub invalid: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Salvaged {
    pub records: Vec<ClaimRecord>,
    pub report: SalvageReport,
}

/// Wire shape of one claim as the extraction prompt asks for it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClaim {
    claim: String,
    category: String,
    source: String,
    date: Value,
    verification_status: String,
    journals_verified: Vec<String>,
    journals_questioned: Vec<String>,
    journals_debunked: Vec<String>,
    score: f64,
}

/// Extract every valid claim record from a raw oracle response.
///
/// Fails with [`SalvageError::Truncated`] when the cleaned response ends with a
/// truncation marker or lacks the closing `]`, even if complete records precede
/// the cut. Otherwise bad records are skipped, and only an empty yield fails.
pub fn salvage_claims(response: &str) -> Result<Salvaged, SalvageError> {
    let cleaned = strip_code_blocks(response);

    if looks_truncated(&cleaned) {
        warn!(
            tail = tail(&cleaned, 80),
            "Response is incomplete or was truncated"
        );
        return Err(SalvageError::Truncated);
    }

    let mut report = SalvageReport::default();
    let mut records = Vec::new();

    for candidate in CLAIM_OBJECT.find_iter(&cleaned) {
        report.candidates += 1;
        let candidate = candidate.as_str();

        let object = match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(object)) => object,
            Ok(_) | Err(_) => {
                warn!(
                    candidate = truncate_to_char_boundary(candidate, 300),
                    "Skipping unparseable claim"
                );
                report.unparseable += 1;
                continue;
            }
        };

        let missing = missing_fields(&object);
        if !missing.is_empty() {
            warn!(missing = %missing.join(", "), "Incomplete claim, skipping");
            report.incomplete += 1;
            continue;
        }

        match to_record(object) {
            Ok(record) => {
                report.accepted += 1;
                records.push(record);
            }
            Err(reason) => {
                warn!(
                    reason = %reason,
                    candidate = truncate_to_char_boundary(candidate, 300),
                    "Invalid claim values, skipping"
                );
                report.invalid += 1;
            }
        }
    }

    debug!(
        candidates = report.candidates,
        accepted = report.accepted,
        unparseable = report.unparseable,
        incomplete = report.incomplete,
        invalid = report.invalid,
        "Salvage complete"
    );

    if records.is_empty() {
        return Err(SalvageError::NoValidRecords {
            candidates: report.candidates,
        });
    }

    Ok(Salvaged { records, report })
}

fn looks_truncated(cleaned: &str) -> bool {
    TRUNCATION_MARKERS.iter().any(|m| cleaned.ends_with(m)) || !cleaned.ends_with(']')
}

fn tail(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(max_chars)).collect()
}

fn missing_fields(object: &Map<String, Value>) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .into_iter()
        .filter(|field| !object.contains_key(*field))
        .collect()
}

fn to_record(object: Map<String, Value>) -> Result<ClaimRecord, String> {
    let raw: RawClaim = serde_json::from_value(Value::Object(object)).map_err(|e| e.to_string())?;

    let date = match &raw.date {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => return Err(format!("date must be a string, got {other}")),
    };

    let score = if (0.0..=1.0).contains(&raw.score) {
        raw.score
    } else {
        let clamped = raw.score.clamp(0.0, 1.0);
        warn!(score = raw.score, clamped, "Claim score out of range, clamping");
        clamped
    };

    Ok(ClaimRecord {
        text: raw.claim.trim().to_string(),
        category: ClaimCategory::from(raw.category),
        source: format!("{} ({})", raw.source.trim(), date),
        verification_status: VerificationStatus::from(raw.verification_status),
        journals_verified: raw.journals_verified,
        journals_questioned: raw.journals_questioned,
        journals_debunked: raw.journals_debunked,
        score,
    })
}
