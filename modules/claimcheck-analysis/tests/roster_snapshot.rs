use std::io::Write;

use claimcheck_analysis::leaderboard::{standing, stats, Trend};
use claimcheck_analysis::store::{ClaimHistory, IdentityRoster, MemoryStore};

const SNAPSHOT: &str = r#"{
    "identities": [
        {"id": 7, "handle": "drsmith", "aliases": ["smithmd"]},
        {"id": 9, "handle": "fitjane"}
    ],
    "claims": [
        {"id": 1, "subjectId": 7, "text": "Saunas extend lifespan", "score": 0.9, "firstDetectedAt": "2024-01-01T00:00:00Z"},
        {"id": 2, "subjectId": 7, "text": "Seed oils cause inflammation", "score": 0.3, "firstDetectedAt": "2024-06-01T00:00:00Z"},
        {"id": 3, "subjectId": 9, "text": "Creatine improves memory", "score": 0.6, "firstDetectedAt": "2024-03-01T00:00:00Z"}
    ]
}"#;

fn snapshot_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn leaderboard_from_snapshot_file() {
    let file = snapshot_file();
    let store = MemoryStore::load(file.path()).unwrap();

    let identities = store.identities().await.unwrap();
    assert_eq!(identities.len(), 2);

    let smith = store.claims_for(7).await.unwrap();
    let row = standing(7, &smith);
    assert_eq!(row.claim_count, 2);
    assert_eq!(row.trust_score, 0.6);
    // The newer claim scores lower.
    assert_eq!(row.trend, Trend::Down);

    let mut all = smith;
    all.extend(store.claims_for(9).await.unwrap());
    let summary = stats(identities.len(), &all);
    assert_eq!(summary.total_subjects, 2);
    assert_eq!(summary.total_claims, 3);
    assert_eq!(summary.average_trust_score, 0.6);
}

#[test]
fn unreadable_snapshot_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = MemoryStore::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("missing.json"));
}
