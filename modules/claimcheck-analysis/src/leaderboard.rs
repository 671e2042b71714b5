//! Leaderboard scoring over stored claim scores.

use claimcheck_common::StoredClaim;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardStats {
    pub total_subjects: usize,
    pub total_claims: usize,
    pub average_trust_score: f64,
}

/// One subject's row on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub subject_id: i64,
    pub trust_score: f64,
    pub trend: Trend,
    pub claim_count: usize,
}

/// Mean score rounded to one decimal; 0 when there are no scores.
pub fn trust_score(scores: &[f64]) -> f64 {
    round_one_decimal(mean(scores).unwrap_or(0.0))
}

/// Compare the newer half of the scores against the older half.
///
/// `newest_first` must be ordered most recent first. The split point is
/// `len / 2`, so with an odd count the older half is the larger one.
pub fn trend(newest_first: &[f64]) -> Trend {
    if newest_first.len() < 2 {
        return Trend::Up;
    }
    let (recent, older) = newest_first.split_at(newest_first.len() / 2);
    match (mean(recent), mean(older)) {
        (Some(recent), Some(older)) if recent < older => Trend::Down,
        _ => Trend::Up,
    }
}

pub fn standing(subject_id: i64, claims: &[StoredClaim]) -> Standing {
    let mut ordered: Vec<&StoredClaim> = claims.iter().collect();
    ordered.sort_by(|a, b| b.first_detected_at.cmp(&a.first_detected_at));
    let scores: Vec<f64> = ordered.iter().map(|c| c.score).collect();

    Standing {
        subject_id,
        trust_score: trust_score(&scores),
        trend: trend(&scores),
        claim_count: scores.len(),
    }
}

pub fn stats(total_subjects: usize, claims: &[StoredClaim]) -> LeaderboardStats {
    let scores: Vec<f64> = claims.iter().map(|c| c.score).collect();
    LeaderboardStats {
        total_subjects,
        total_claims: claims.len(),
        average_trust_score: trust_score(&scores),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
