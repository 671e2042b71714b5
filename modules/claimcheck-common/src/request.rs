use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::ClaimCheckError;

pub const MIN_CLAIMS: u32 = 1;
pub const MAX_CLAIMS: u32 = 100;
pub const MIN_MAX_TOKENS: u32 = 100;
pub const MAX_MAX_TOKENS: u32 = 5000;
pub const MAX_NOTES_CHARS: usize = 1000;

/// Window of the subject's content to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "Last Week")]
    LastWeek,
    #[serde(rename = "Last Month")]
    LastMonth,
    #[serde(rename = "Last Year")]
    LastYear,
    #[serde(rename = "All Time")]
    AllTime,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::LastWeek,
        TimeRange::LastMonth,
        TimeRange::LastYear,
        TimeRange::AllTime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::LastWeek => "Last Week",
            TimeRange::LastMonth => "Last Month",
            TimeRange::LastYear => "Last Year",
            TimeRange::AllTime => "All Time",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = ClaimCheckError;

    /// Accepts the display label ("Last Week") or a slug ("last-week", "last_week").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|range| range.label().to_lowercase() == normalized)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|r| r.label()).collect();
                ClaimCheckError::Validation(format!(
                    "time range must be one of {}, got {s:?}",
                    allowed.join(", ")
                ))
            })
    }
}

/// A caller's request to research one subject's claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[builder(setter(into))]
    pub handle: String,
    pub time_range: TimeRange,
    pub claims_count: u32,
    pub journals: Vec<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub notes: Option<String>,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl AnalysisRequest {
    pub fn validate(&self) -> Result<(), ClaimCheckError> {
        if self.handle.trim().is_empty() {
            return Err(ClaimCheckError::Validation("handle must not be empty".into()));
        }
        if !(MIN_CLAIMS..=MAX_CLAIMS).contains(&self.claims_count) {
            return Err(ClaimCheckError::Validation(format!(
                "claims count must be between {MIN_CLAIMS} and {MAX_CLAIMS}, got {}",
                self.claims_count
            )));
        }
        if self.journals.iter().all(|j| j.trim().is_empty()) {
            return Err(ClaimCheckError::Validation(
                "at least one journal must be selected".into(),
            ));
        }
        if let Some(notes) = &self.notes {
            let len = notes.chars().count();
            if len > MAX_NOTES_CHARS {
                return Err(ClaimCheckError::Validation(format!(
                    "notes must be at most {MAX_NOTES_CHARS} characters, got {len}"
                )));
            }
        }
        if let Some(max_tokens) = self.max_tokens {
            if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&max_tokens) {
                return Err(ClaimCheckError::Validation(format!(
                    "max tokens must be between {MIN_MAX_TOKENS} and {MAX_MAX_TOKENS}, got {max_tokens}"
                )));
            }
        }
        Ok(())
    }

    /// Journal names with blanks removed, in the order given.
    pub fn journal_names(&self) -> Vec<&str> {
        self.journals
            .iter()
            .map(|j| j.trim())
            .filter(|j| !j.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AnalysisRequest {
        AnalysisRequest::builder()
            .handle("hubermanlab")
            .time_range(TimeRange::LastMonth)
            .claims_count(5)
            .journals(vec!["Nature".to_string(), "PubMed Central".to_string()])
            .build()
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn claims_count_bounds() {
        let mut req = request();
        req.claims_count = 0;
        assert!(req.validate().is_err());
        req.claims_count = 101;
        assert!(req.validate().is_err());
        req.claims_count = 100;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_journals_rejected() {
        let mut req = request();
        req.journals = vec!["  ".to_string()];
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("journal"));
    }

    #[test]
    fn max_tokens_bounds() {
        let mut req = request();
        req.max_tokens = Some(99);
        assert!(req.validate().is_err());
        req.max_tokens = Some(5000);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn long_notes_rejected() {
        let mut req = request();
        req.notes = Some("x".repeat(1001));
        assert!(req.validate().is_err());
    }

    #[test]
    fn time_range_parses_labels_and_slugs() {
        assert_eq!("Last Week".parse::<TimeRange>().unwrap(), TimeRange::LastWeek);
        assert_eq!("all-time".parse::<TimeRange>().unwrap(), TimeRange::AllTime);
        assert_eq!("last_year".parse::<TimeRange>().unwrap(), TimeRange::LastYear);
        assert!("Last Decade".parse::<TimeRange>().is_err());
    }

    #[test]
    fn request_deserializes_from_camel_case() {
        let req: AnalysisRequest = serde_json::from_str(
            r#"{"handle":"x","timeRange":"All Time","claimsCount":3,"journals":["Nature"],"maxTokens":2000}"#,
        )
        .unwrap();
        assert_eq!(req.time_range, TimeRange::AllTime);
        assert_eq!(req.max_tokens, Some(2000));
        assert!(req.notes.is_none());
    }
}
