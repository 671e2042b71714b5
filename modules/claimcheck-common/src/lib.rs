pub mod config;
pub mod error;
pub mod request;
pub mod types;

pub use config::{AnalysisSettings, Config, DedupThresholds, GenerationSettings};
pub use error::{ClaimCheckError, OracleStage};
pub use request::{AnalysisRequest, TimeRange};
pub use types::*;
