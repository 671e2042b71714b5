pub mod analyzer;
pub mod dedup;
pub mod identity;
pub mod leaderboard;
pub mod prompts;
pub mod salvage;
pub mod similarity;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use analyzer::{classify_oracle_error, AnalysisStage, Analyzer, Research};
pub use dedup::{dedupe, find_existing, split_against_history, ClaimDisposition};
pub use identity::{
    display_name_from_handle, handle_from_name, resolve, verification_failed, IdentityDecision,
};
pub use leaderboard::{LeaderboardStats, Standing, Trend};
pub use salvage::{salvage_claims, Salvaged, SalvageError, SalvageReport};
pub use similarity::similarity;
pub use store::{ClaimHistory, IdentityRoster, MemoryStore};
