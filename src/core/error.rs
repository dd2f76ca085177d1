use crate::core::scorer::ScoringError;
use crate::services::store::StoreError;
use thiserror::Error;

/// Failures that end a matching run
///
/// Malformed oracle output and notification failures never show up here:
/// the scorer downgrades the former to an empty result and the recorder
/// logs and drops the latter.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Item not found")]
    NotFound,

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl PipelineError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, PipelineError::Scoring(ScoringError::RateLimited))
    }
}
