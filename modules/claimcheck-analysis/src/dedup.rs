//! Claim deduplication by text similarity.
//!
//! Within a batch, earlier claims always win over later near-duplicates. Against
//! stored history a separate, stricter threshold applies.

use claimcheck_common::{ClaimRecord, StoredClaim};
use serde::Serialize;

use crate::similarity::similarity;

pub const DEFAULT_BATCH_THRESHOLD: f64 = 0.75;
pub const DEFAULT_HISTORY_THRESHOLD: f64 = 0.85;

/// Collapse near-duplicate claims, keeping the first occurrence.
///
/// A candidate is dropped when its text scores at or above `threshold` against
/// any claim already kept. Quadratic in the batch size, which is bounded by
/// the requested claim count.
pub fn dedupe(records: Vec<ClaimRecord>, threshold: f64) -> Vec<ClaimRecord> {
    let mut unique: Vec<ClaimRecord> = Vec::with_capacity(records.len());

    for record in records {
        let is_duplicate = unique
            .iter()
            .any(|kept| similarity(&record.text, &kept.text) >= threshold);

        if !is_duplicate {
            unique.push(record);
        }
    }

    unique
}

/// First stored claim whose text matches `text` at or above `threshold`.
pub fn find_existing<'a>(
    text: &str,
    history: &'a [StoredClaim],
    threshold: f64,
) -> Option<&'a StoredClaim> {
    history
        .iter()
        .find(|stored| similarity(text, &stored.text) >= threshold)
}

/// Whether a freshly extracted claim is new or repeats one already stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum ClaimDisposition {
    New { claim: ClaimRecord },
    Existing { claim: ClaimRecord, existing_id: i64 },
}

impl ClaimDisposition {
    pub fn claim(&self) -> &ClaimRecord {
        match self {
            ClaimDisposition::New { claim } | ClaimDisposition::Existing { claim, .. } => claim,
        }
    }
}

/// Classify each claim against the subject's stored history, preserving order.
pub fn split_against_history(
    claims: Vec<ClaimRecord>,
    history: &[StoredClaim],
    threshold: f64,
) -> Vec<ClaimDisposition> {
    claims
        .into_iter()
        .map(|claim| match find_existing(&claim.text, history, threshold) {
            Some(stored) => ClaimDisposition::Existing {
                existing_id: stored.id,
                claim,
            },
            None => ClaimDisposition::New { claim },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use claimcheck_common::{ClaimCategory, VerificationStatus};

    fn claim(text: &str) -> ClaimRecord {
        ClaimRecord {
            text: text.to_string(),
            category: ClaimCategory::GeneralWellness,
            source: "Podcast (2024-05-01)".to_string(),
            verification_status: VerificationStatus::Questionable,
            journals_verified: Vec::new(),
            journals_questioned: vec!["The Lancet".to_string()],
            journals_debunked: Vec::new(),
            score: 0.4,
        }
    }

    fn stored(id: i64, text: &str) -> StoredClaim {
        StoredClaim {
            id,
            subject_id: 1,
            text: text.to_string(),
            score: 0.5,
            first_detected_at: Utc::now(),
        }
    }

    fn texts(records: &[ClaimRecord]) -> Vec<&str> {
        records.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn drops_later_near_duplicate() {
        let deduped = dedupe(
            vec![
                claim("Cold exposure boosts dopamine levels"),
                claim("Morning sunlight sets circadian rhythm"),
                claim("Cold exposure boosts dopamine level"),
            ],
            DEFAULT_BATCH_THRESHOLD,
        );
        assert_eq!(
            texts(&deduped),
            vec![
                "Cold exposure boosts dopamine levels",
                "Morning sunlight sets circadian rhythm"
            ]
        );
    }

    #[test]
    fn case_only_differences_are_duplicates() {
        let deduped = dedupe(
            vec![claim("Sugar causes ADHD"), claim("SUGAR CAUSES ADHD")],
            DEFAULT_BATCH_THRESHOLD,
        );
        assert_eq!(texts(&deduped), vec!["Sugar causes ADHD"]);
    }

    #[test]
    fn keeps_earliest_of_a_chain() {
        // Whichever of two mutual near-duplicates comes first survives.
        let a = "Fasting improves insulin sensitivity";
        let b = "Fasting improves insulin sensitivities";
        let deduped = dedupe(vec![claim(b), claim(a)], DEFAULT_BATCH_THRESHOLD);
        assert_eq!(texts(&deduped), vec![b]);
    }

    #[test]
    fn output_has_no_pair_at_or_above_threshold() {
        let input = vec![
            claim("Vitamin D boosts immunity"),
            claim("Vitamin D boosts the immune system"),
            claim("Vitamin C boosts immunity"),
            claim("Magnesium improves sleep quality"),
            claim("Magnesium improves sleep"),
            claim("Zinc shortens colds"),
        ];
        let threshold = DEFAULT_BATCH_THRESHOLD;
        let deduped = dedupe(input.clone(), threshold);

        for (i, a) in deduped.iter().enumerate() {
            for b in deduped.iter().skip(i + 1) {
                assert!(similarity(&a.text, &b.text) < threshold);
            }
        }

        // Order-preserving subsequence of the input.
        let mut cursor = input.iter();
        for kept in &deduped {
            assert!(cursor.any(|c| c == kept));
        }
    }

    #[test]
    fn threshold_of_one_only_drops_exact_matches() {
        let deduped = dedupe(
            vec![claim("Sleep is vital"), claim("Sleep is vital!"), claim("sleep is vital")],
            1.0,
        );
        assert_eq!(texts(&deduped), vec!["Sleep is vital", "Sleep is vital!"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(dedupe(Vec::new(), DEFAULT_BATCH_THRESHOLD).is_empty());
    }

    #[test]
    fn find_existing_uses_history_threshold() {
        let history = vec![
            stored(10, "Seed oils cause inflammation"),
            stored(11, "Red light therapy heals skin"),
        ];
        let hit = find_existing("Seed oils cause inflammations", &history, DEFAULT_HISTORY_THRESHOLD);
        assert_eq!(hit.map(|s| s.id), Some(10));

        // Similar enough for the batch bar, not for the history bar.
        let text = "Seed oils trigger inflammation";
        let s = similarity(text, "Seed oils cause inflammation");
        assert!(s >= DEFAULT_BATCH_THRESHOLD && s < DEFAULT_HISTORY_THRESHOLD, "similarity {s}");
        assert!(find_existing(text, &history, DEFAULT_HISTORY_THRESHOLD).is_none());
    }

    #[test]
    fn split_preserves_order_and_links_existing() {
        let history = vec![stored(42, "Creatine improves memory")];
        let split = split_against_history(
            vec![claim("Creatine improves memory"), claim("Saunas extend lifespan")],
            &history,
            DEFAULT_HISTORY_THRESHOLD,
        );
        assert_eq!(split.len(), 2);
        assert!(matches!(&split[0], ClaimDisposition::Existing { existing_id: 42, .. }));
        assert!(matches!(&split[1], ClaimDisposition::New { .. }));
        assert_eq!(split[1].claim().text, "Saunas extend lifespan");
    }
}
