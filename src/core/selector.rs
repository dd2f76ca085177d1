use crate::core::error::PipelineError;
use crate::models::Item;
use crate::services::store::ItemStore;
use std::sync::Arc;
use uuid::Uuid;

/// Upper bound on candidates sent to the scorer in one run
pub const MAX_CANDIDATES: usize = 50;

/// Finds the source item and the counterpart items worth scoring against it
#[derive(Clone)]
pub struct CandidateSelector {
    items: Arc<dyn ItemStore>,
}

impl CandidateSelector {
    pub fn new(items: Arc<dyn ItemStore>) -> Self {
        Self { items }
    }

    /// Look up the item a run was requested for.
    ///
    /// An id that is not a UUID can never resolve, so it is reported the
    /// same way as a missing row.
    pub async fn resolve_source(&self, item_id: &str) -> Result<Item, PipelineError> {
        let id = Uuid::parse_str(item_id.trim()).map_err(|_| {
            tracing::info!("Rejecting malformed item id {:?}", item_id);
            PipelineError::NotFound
        })?;

        self.items.get_item(id).await?.ok_or_else(|| {
            tracing::info!("Source item {} not found", id);
            PipelineError::NotFound
        })
    }

    /// Active items of the opposite category owned by someone else.
    ///
    /// One store read, no retry. An empty list is a normal outcome. The limit
    /// is passed to the store and applied again here, so a store that ignores
    /// it still can't push more than [`MAX_CANDIDATES`] items to the scorer.
    pub async fn select(&self, source: &Item) -> Result<Vec<Item>, PipelineError> {
        let candidates = self.items.find_candidates(source, MAX_CANDIDATES).await?;

        Ok(candidates.into_iter().take(MAX_CANDIDATES).collect())
    }
}
