use crate::models::{Item, ScoredCandidate};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Minimum score for a candidate to be recorded as a match
pub const MATCH_THRESHOLD: f64 = 0.5;

/// Errors from a scoring backend
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The oracle signalled throttling; callers should retry later
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Scoring oracle unavailable: {0}")]
    Unavailable(String),
}

/// Compares one source item against its candidates
///
/// Implementations are free to return entries in any order and to omit
/// candidates they consider unrelated.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, source: &Item, candidates: &[Item]) -> Result<Vec<ScoredCandidate>, ScoringError>;
}

/// Keep only entries that reference a supplied candidate and carry a usable score.
///
/// Ids are compared as UUIDs and rewritten in canonical form; non-finite
/// scores are dropped and the rest clamped to [0, 1].
pub fn retain_known_candidates(scored: Vec<ScoredCandidate>, candidates: &[Item]) -> Vec<ScoredCandidate> {
    scored
        .into_iter()
        .filter_map(|mut entry| {
            let id = match Uuid::parse_str(entry.item_id.trim()) {
                Ok(id) if candidates.iter().any(|c| c.id == id) => id,
                _ => {
                    tracing::warn!("Ignoring scored entry for unknown item {:?}", entry.item_id);
                    return None;
                }
            };

            if !entry.score.is_finite() {
                tracing::warn!("Ignoring non-finite score for item {}", id);
                return None;
            }

            entry.item_id = id.to_string();
            entry.score = entry.score.clamp(0.0, 1.0);
            Some(entry)
        })
        .collect()
}

/// True when a score clears [`MATCH_THRESHOLD`]
#[inline]
pub fn is_match_worthy(score: f64) -> bool {
    score >= MATCH_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemCategory, ItemStatus};
    use chrono::{NaiveDate, Utc};

    fn candidate() -> Item {
        Item {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "keys".to_string(),
            description: "three keys on a ring".to_string(),
            category: ItemCategory::Found,
            location: "Park".to_string(),
            item_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            status: ItemStatus::Active,
            image_urls: vec![],
            created_at: Utc::now(),
        }
    }

    fn entry(item_id: &str, score: f64) -> ScoredCandidate {
        ScoredCandidate {
            item_id: item_id.to_string(),
            score,
            reason: "r".to_string(),
        }
    }

    #[test]
    fn test_unknown_ids_dropped() {
        let known = candidate();
        let scored = vec![
            entry(&known.id.to_string(), 0.8),
            entry(&Uuid::new_v4().to_string(), 0.9),
            entry("not-a-uuid", 0.9),
        ];

        let kept = retain_known_candidates(scored, &[known.clone()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].item_id, known.id.to_string());
    }

    #[test]
    fn test_ids_canonicalized() {
        let known = candidate();
        let upper = known.id.to_string().to_uppercase();

        let kept = retain_known_candidates(vec![entry(&upper, 0.7)], &[known.clone()]);
        assert_eq!(kept[0].item_id, known.id.to_string());
    }

    #[test]
    fn test_scores_clamped_and_nan_dropped() {
        let known = candidate();
        let id = known.id.to_string();

        let kept = retain_known_candidates(
            vec![entry(&id, 1.7), entry(&id, -0.2), entry(&id, f64::NAN)],
            &[known],
        );

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 1.0);
        assert_eq!(kept[1].score, 0.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(is_match_worthy(0.5));
        assert!(!is_match_worthy(0.49));
    }
}
