//! Persistence-facing seams. The analysis core only reads: a roster of known
//! identities and the claims already stored per identity. Writes stay with
//! the caller.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use claimcheck_common::{ExistingIdentity, StoredClaim};
use serde::Deserialize;

#[async_trait]
pub trait IdentityRoster: Send + Sync {
    /// Every known identity, in the order resolution should consider them.
    async fn identities(&self) -> Result<Vec<ExistingIdentity>>;
}

#[async_trait]
pub trait ClaimHistory: Send + Sync {
    async fn claims_for(&self, subject_id: i64) -> Result<Vec<StoredClaim>>;
}

/// Roster and claim history held in memory. Loadable from a JSON snapshot of
/// the shape `{"identities": [...], "claims": [...]}`; both keys are optional.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    identities: Vec<ExistingIdentity>,
    claims: HashMap<i64, Vec<StoredClaim>>,
}

#[derive(Deserialize)]
struct Snapshot {
    #[serde(default)]
    identities: Vec<ExistingIdentity>,
    #[serde(default)]
    claims: Vec<StoredClaim>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: ExistingIdentity) -> Self {
        self.identities.push(identity);
        self
    }

    pub fn with_claim(mut self, claim: StoredClaim) -> Self {
        self.claims.entry(claim.subject_id).or_default().push(claim);
        self
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(content).context("Failed to parse roster snapshot")?;
        let store = snapshot
            .claims
            .into_iter()
            .fold(Self::new(), |store, claim| store.with_claim(claim));
        Ok(Self {
            identities: snapshot.identities,
            ..store
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid roster file {}", path.display()))
    }
}

#[async_trait]
impl IdentityRoster for MemoryStore {
    async fn identities(&self) -> Result<Vec<ExistingIdentity>> {
        Ok(self.identities.clone())
    }
}

#[async_trait]
impl ClaimHistory for MemoryStore {
    async fn claims_for(&self, subject_id: i64) -> Result<Vec<StoredClaim>> {
        Ok(self.claims.get(&subject_id).cloned().unwrap_or_default())
    }
}
