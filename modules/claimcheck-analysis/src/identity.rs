//! Identity resolution: decide whether a freshly verified subject is someone
//! already on the roster (merge) or a new identity (create).

use claimcheck_common::{ClaimCheckError, ExistingIdentity, MatchResult, SubjectVerification};
use serde::Serialize;
use tracing::{debug, warn};

/// Find the first roster entry sharing any handle or alias with the verified subject.
///
/// Comparison is case-insensitive and blank handles never match. Roster order
/// decides ties; there is no ranking.
pub fn resolve(
    verification: &SubjectVerification,
    existing: &[ExistingIdentity],
) -> Option<MatchResult> {
    if !verification.is_recognized_subject {
        return None;
    }
    let details = verification.details.as_ref()?;
    let candidates =
        folded_handles(std::iter::once(&details.primary_handle).chain(&details.aliases));

    existing
        .iter()
        .find(|identity| {
            folded_handles(std::iter::once(&identity.handle).chain(&identity.aliases))
                .iter()
                .any(|h| candidates.contains(h))
        })
        .map(|identity| MatchResult {
            id: identity.id,
            handle: identity.handle.clone(),
        })
}

/// Trimmed, lowercased, non-blank handles.
fn folded_handles<'a>(handles: impl Iterator<Item = &'a String>) -> Vec<String> {
    handles
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// What the persistence layer should do with a verified subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum IdentityDecision {
    Update { id: i64, handle: String },
    Create { handle: String },
}

impl IdentityDecision {
    /// Build the decision for a verification of `requested_handle` against the roster.
    pub fn decide(
        requested_handle: &str,
        verification: &SubjectVerification,
        existing: &[ExistingIdentity],
    ) -> Result<Self, ClaimCheckError> {
        if !verification.is_recognized_subject {
            return Err(ClaimCheckError::NotRecognized {
                handle: requested_handle.to_string(),
                reason: verification
                    .reason
                    .clone()
                    .unwrap_or_else(|| "no reason given".to_string()),
            });
        }
        let details = verification.details.as_ref().ok_or_else(|| {
            ClaimCheckError::InvariantViolation(format!(
                "verification of {requested_handle} is recognized but carries no details"
            ))
        })?;

        let decision = match resolve(verification, existing) {
            Some(found) => IdentityDecision::Update {
                id: found.id,
                handle: found.handle,
            },
            None => IdentityDecision::Create {
                handle: handle_from_name(&details.main_name),
            },
        };
        debug!(requested = requested_handle, ?decision, "Identity resolved");
        Ok(decision)
    }

    pub fn handle(&self) -> &str {
        match self {
            IdentityDecision::Update { handle, .. } | IdentityDecision::Create { handle } => handle,
        }
    }
}

/// Handle for a newly created identity: the main name lowercased, whitespace removed.
pub fn handle_from_name(main_name: &str) -> String {
    main_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Turn a verification that produced no usable answer into a not-recognized
/// outcome named by the handle's display name. Other errors pass through.
pub fn verification_failed(handle: &str, err: ClaimCheckError) -> ClaimCheckError {
    match err {
        ClaimCheckError::MalformedResponse(_) | ClaimCheckError::InvariantViolation(_) => {
            warn!(handle, error = %err, "Verification produced no usable answer");
            ClaimCheckError::NotRecognized {
                handle: display_name_from_handle(handle),
                reason: err.to_string(),
            }
        }
        other => other,
    }
}

/// Human-readable name for a handle: `"andrew_huberman-md"` becomes `"Andrew Huberman Md"`.
pub fn display_name_from_handle(handle: &str) -> String {
    handle
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimcheck_common::SubjectDetails;

    fn recognized(handle: &str, aliases: &[&str]) -> SubjectVerification {
        SubjectVerification {
            is_recognized_subject: true,
            reason: None,
            details: Some(SubjectDetails {
                primary_handle: handle.to_string(),
                main_name: "Jane Smith".to_string(),
                description: String::new(),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
                content_tags: Vec::new(),
                yearly_revenue_usd: 0,
                total_followers: 0,
            }),
        }
    }

    fn identity(id: i64, handle: &str, aliases: &[&str]) -> ExistingIdentity {
        ExistingIdentity {
            id,
            handle: handle.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn alias_overlap_resolves_to_existing() {
        let roster = vec![identity(7, "drsmith", &["smithmd"])];
        let found = resolve(&recognized("Dr.Smith", &["smithmd"]), &roster);
        assert_eq!(
            found,
            Some(MatchResult {
                id: 7,
                handle: "drsmith".to_string()
            })
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let roster = vec![identity(3, "HubermanLab", &[])];
        let found = resolve(&recognized("hubermanlab", &[]), &roster).unwrap();
        assert_eq!(found.id, 3);
        assert_eq!(found.handle, "HubermanLab");

        let roster = vec![identity(7, "ärztinmaria", &[])];
        let found = resolve(&recognized("ÄrztinMaria", &[]), &roster).unwrap();
        assert_eq!(found.id, 7);
    }

    #[test]
    fn non_ascii_aliases_fold_case() {
        let roster = vec![identity(4, "someone", &["ΣΩΚΡΆΤΗΣ"])];
        let found = resolve(&recognized("fresh", &["σωκράτης"]), &roster);
        assert_eq!(found.map(|m| m.id), Some(4));
    }

    #[test]
    fn first_roster_entry_wins() {
        let roster = vec![
            identity(1, "other", &["shared"]),
            identity(2, "shared", &[]),
        ];
        assert_eq!(resolve(&recognized("shared", &[]), &roster).unwrap().id, 1);
    }

    #[test]
    fn unrecognized_never_matches() {
        let mut verification = recognized("drsmith", &[]);
        verification.is_recognized_subject = false;
        let roster = vec![identity(7, "drsmith", &[])];
        assert!(resolve(&verification, &roster).is_none());
    }

    #[test]
    fn missing_details_never_matches() {
        let verification = SubjectVerification {
            is_recognized_subject: true,
            reason: None,
            details: None,
        };
        assert!(resolve(&verification, &[identity(1, "x", &[])]).is_none());
    }

    #[test]
    fn blank_handles_do_not_match_each_other() {
        let roster = vec![identity(9, "someone", &["", "  "])];
        assert!(resolve(&recognized("fresh", &[" "]), &roster).is_none());
    }

    #[test]
    fn decide_updates_known_identity() {
        let roster = vec![identity(7, "drsmith", &["smithmd"])];
        let decision =
            IdentityDecision::decide("Dr.Smith", &recognized("Dr.Smith", &["smithmd"]), &roster)
                .unwrap();
        assert_eq!(
            decision,
            IdentityDecision::Update {
                id: 7,
                handle: "drsmith".to_string()
            }
        );
    }

    #[test]
    fn decide_creates_with_handle_from_main_name() {
        let decision =
            IdentityDecision::decide("janesmith", &recognized("janesmith", &[]), &[]).unwrap();
        assert_eq!(
            decision,
            IdentityDecision::Create {
                handle: "janesmith".to_string()
            }
        );
        assert_eq!(decision.handle(), "janesmith");
    }

    #[test]
    fn decide_rejects_unrecognized_with_reason() {
        let verification = SubjectVerification {
            is_recognized_subject: false,
            reason: Some("Gaming channel".to_string()),
            details: None,
        };
        let err = IdentityDecision::decide("gamer_guy", &verification, &[]).unwrap_err();
        assert!(matches!(
            err,
            ClaimCheckError::NotRecognized { ref handle, ref reason }
                if handle == "gamer_guy" && reason == "Gaming channel"
        ));
    }

    #[test]
    fn decide_keeps_mixed_case_handle_for_unrecognized() {
        let verification = SubjectVerification {
            is_recognized_subject: false,
            reason: None,
            details: None,
        };
        let err = IdentityDecision::decide("HubermanLab", &verification, &[]).unwrap_err();
        assert_eq!(err.user_message(), "HubermanLab is not a recognized health influencer");
    }

    #[test]
    fn failed_verification_uses_display_name() {
        let err = verification_failed(
            "peter_attia",
            ClaimCheckError::MalformedResponse("no JSON object".to_string()),
        );
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "Peter Attia is not a recognized health influencer");

        let err = verification_failed(
            "peter_attia",
            ClaimCheckError::UpstreamUnavailable("503".into()),
        );
        assert!(matches!(err, ClaimCheckError::UpstreamUnavailable(_)));
    }

    #[test]
    fn decide_flags_recognized_without_details() {
        let verification = SubjectVerification {
            is_recognized_subject: true,
            reason: None,
            details: None,
        };
        let err = IdentityDecision::decide("x", &verification, &[]).unwrap_err();
        assert!(matches!(err, ClaimCheckError::InvariantViolation(_)));
    }

    #[test]
    fn handle_from_name_strips_whitespace() {
        assert_eq!(handle_from_name("Andrew  Huberman\t"), "andrewhuberman");
        assert_eq!(handle_from_name("Dr. Rhonda Patrick"), "dr.rhondapatrick");
    }

    #[test]
    fn display_name_title_cases_words() {
        assert_eq!(display_name_from_handle("andrew_huberman"), "Andrew Huberman");
        assert_eq!(display_name_from_handle("peter-attia_MD"), "Peter Attia Md");
        assert_eq!(display_name_from_handle("solo"), "Solo");
        assert_eq!(display_name_from_handle("__x"), "X");
    }
}
