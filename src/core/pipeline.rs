use crate::core::error::PipelineError;
use crate::core::recorder::MatchRecorder;
use crate::core::scorer::{retain_known_candidates, MatchScorer};
use crate::core::selector::CandidateSelector;
use crate::models::{MatchRecord, ScoredCandidate};
use crate::services::notifier::Notifier;
use crate::services::store::{ItemStore, MatchStore};
use std::sync::Arc;

/// Result of one matching run
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    /// Everything the scorer reported about this run's candidates, below the
    /// threshold included, with scores clamped to [0, 1]
    pub matches: Vec<ScoredCandidate>,
    /// Records newly written by this run
    pub recorded: Vec<MatchRecord>,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Resolve the source item and select counterpart candidates
/// 2. Score candidates against the source
/// 3. Record qualifying pairs and notify both owners
///
/// Stages run strictly in sequence; nothing is shared between runs except
/// the store.
#[derive(Clone)]
pub struct MatchPipeline {
    selector: CandidateSelector,
    scorer: Arc<dyn MatchScorer>,
    recorder: MatchRecorder,
}

impl MatchPipeline {
    pub fn new(
        items: Arc<dyn ItemStore>,
        matches: Arc<dyn MatchStore>,
        scorer: Arc<dyn MatchScorer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            selector: CandidateSelector::new(items),
            scorer,
            recorder: MatchRecorder::new(matches, notifier),
        }
    }

    /// Run the full pipeline for one item id
    pub async fn run(&self, item_id: &str) -> Result<PipelineOutcome, PipelineError> {
        tracing::info!("Finding matches for item: {}", item_id);

        let source = self.selector.resolve_source(item_id).await?;
        let candidates = self.selector.select(&source).await?;

        if candidates.is_empty() {
            tracing::info!("No potential matches found for item {}", source.id);
            return Ok(PipelineOutcome::default());
        }

        tracing::info!("Found {} potential matches to analyze", candidates.len());

        // Only this run's candidates, scores clamped to [0, 1]
        let scored = self.scorer.score(&source, &candidates).await?;
        let matches = retain_known_candidates(scored, &candidates);
        let recorded = self.recorder.record(&source, &candidates, &matches).await?;

        Ok(PipelineOutcome {
            matches,
            recorded: recorded.created,
        })
    }
}
