use crate::core::error::PipelineError;
use crate::core::scorer::is_match_worthy;
use crate::models::{Item, MatchPair, MatchRecord, NewMatch, NotificationRequest, NotificationType, ScoredCandidate};
use crate::services::notifier::Notifier;
use crate::services::store::MatchStore;
use std::sync::Arc;

pub const MATCH_NOTIFICATION_TITLE: &str = "Potential Match Found!";

/// What one recording pass wrote
#[derive(Debug, Default)]
pub struct RecordOutcome {
    /// Records inserted by this pass
    pub created: Vec<MatchRecord>,
    /// Qualifying pairs that were already recorded
    pub already_recorded: usize,
}

/// Persists qualifying matches once per pair and tells both owners
#[derive(Clone)]
pub struct MatchRecorder {
    matches: Arc<dyn MatchStore>,
    notifier: Arc<dyn Notifier>,
}

impl MatchRecorder {
    pub fn new(matches: Arc<dyn MatchStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { matches, notifier }
    }

    /// Record every scored entry that clears the threshold.
    ///
    /// Entries are processed in order. A store failure stops the loop and is
    /// returned; records written before it stay written. Notification
    /// failures are logged and never stop the loop.
    pub async fn record(
        &self,
        source: &Item,
        candidates: &[Item],
        scored: &[ScoredCandidate],
    ) -> Result<RecordOutcome, PipelineError> {
        let mut outcome = RecordOutcome::default();

        for entry in scored {
            if !is_match_worthy(entry.score) {
                continue;
            }

            let Some(candidate) = candidates.iter().find(|c| c.id.to_string() == entry.item_id) else {
                tracing::warn!("Scored entry {} has no matching candidate", entry.item_id);
                continue;
            };

            let new_match = NewMatch {
                pair: MatchPair::normalize(source, candidate),
                score: entry.score,
                reason: Some(entry.reason.clone()).filter(|r| !r.is_empty()),
            };

            let Some(record) = self.matches.insert_if_absent(new_match).await? else {
                outcome.already_recorded += 1;
                continue;
            };

            self.notify_owners(source, candidate).await;
            outcome.created.push(record);
        }

        tracing::info!(
            "Recorded {} new matches for item {} ({} already known)",
            outcome.created.len(),
            source.id,
            outcome.already_recorded
        );

        Ok(outcome)
    }

    /// One notification per owner, candidate's owner first. Each attempt is
    /// independent of the other.
    async fn notify_owners(&self, source: &Item, candidate: &Item) {
        let requests = [
            match_notification(candidate, source),
            match_notification(source, candidate),
        ];

        for request in &requests {
            if let Err(e) = self.notifier.notify(request).await {
                tracing::warn!(
                    "Failed to notify user {} about item {}: {}",
                    request.user_id,
                    source.id,
                    e
                );
            }
        }

        tracing::debug!("Match notifications dispatched for {} and {}", source.id, candidate.id);
    }
}

/// Notification for the owner of `own`, pointing at `other`
pub fn match_notification(own: &Item, other: &Item) -> NotificationRequest {
    NotificationRequest {
        notification_type: NotificationType::Match,
        user_id: own.user_id,
        title: MATCH_NOTIFICATION_TITLE.to_string(),
        message: format!(
            "Your {} item \"{}\" might match a {} item: \"{}\"",
            own.category, own.title, other.category, other.title
        ),
        item_id: Some(own.id),
        related_item_id: Some(other.id),
        send_email: Some(true),
    }
}
