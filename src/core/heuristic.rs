use crate::core::scorer::{is_match_worthy, MatchScorer, ScoringError};
use crate::models::{Item, ScoredCandidate, ScoringWeights};
use async_trait::async_trait;
use std::collections::HashSet;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "at", "by", "for", "in", "is", "it", "my", "near", "of", "on", "or", "the",
    "to", "with",
];

/// Deterministic scorer for environments without a language-model provider
///
/// Score formula:
/// score = (
///     text_score * w.text +          # Jaccard overlap of title + description tokens
///     location_score * w.location +  # Same location, or overlap of location tokens
///     date_score * w.date            # Exponential decay over the day difference
/// ) / (w.text + w.location + w.date)
///
/// Like the oracle, it only reports candidates that clear the match threshold.
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    weights: ScoringWeights,
    date_window_days: f64,
}

impl HeuristicScorer {
    pub fn new(weights: ScoringWeights, date_window_days: f64) -> Self {
        Self {
            weights,
            date_window_days: date_window_days.max(1.0),
        }
    }

    /// Score a single candidate against the source (0-1)
    pub fn score_pair(&self, source: &Item, candidate: &Item) -> (f64, String) {
        let text_score = jaccard(
            &tokenize(&format!("{} {}", source.title, source.description)),
            &tokenize(&format!("{} {}", candidate.title, candidate.description)),
        );

        let location_score = calculate_location_score(&source.location, &candidate.location);

        let days_apart = (source.item_date - candidate.item_date).num_days().abs();
        let date_score = calculate_date_score(days_apart, self.date_window_days);

        let total_weight = self.weights.text + self.weights.location + self.weights.date;
        let score = if total_weight > 0.0 {
            (text_score * self.weights.text
                + location_score * self.weights.location
                + date_score * self.weights.date)
                / total_weight
        } else {
            0.0
        };

        let location_phrase = if location_score >= 1.0 {
            "same location".to_string()
        } else if location_score > 0.0 {
            "nearby location".to_string()
        } else {
            "different location".to_string()
        };

        let date_phrase = match days_apart {
            0 => "same day".to_string(),
            1 => "1 day apart".to_string(),
            n => format!("{} days apart", n),
        };

        let reason = format!(
            "{:.0}% description overlap, {}, {}",
            text_score * 100.0,
            location_phrase,
            date_phrase
        );

        (score.clamp(0.0, 1.0), reason)
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default(), 7.0)
    }
}

#[async_trait]
impl MatchScorer for HeuristicScorer {
    async fn score(&self, source: &Item, candidates: &[Item]) -> Result<Vec<ScoredCandidate>, ScoringError> {
        let mut scored: Vec<ScoredCandidate> = candidates
            .iter()
            .filter_map(|candidate| {
                let (score, reason) = self.score_pair(source, candidate);
                is_match_worthy(score).then(|| ScoredCandidate {
                    item_id: candidate.id.to_string(),
                    score,
                    reason,
                })
            })
            .collect();

        // Best first
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!(
            "Heuristic scorer kept {} of {} candidates for item {}",
            scored.len(),
            candidates.len(),
            source.id
        );

        Ok(scored)
    }
}

/// Lowercased alphanumeric tokens without stopwords
fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

#[inline]
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Location score (0-1)
/// Exact match after normalisation is 1, otherwise token overlap
#[inline]
fn calculate_location_score(a: &str, b: &str) -> f64 {
    let a_norm = a.trim().to_lowercase();
    let b_norm = b.trim().to_lowercase();

    if a_norm.is_empty() || b_norm.is_empty() {
        return 0.0;
    }
    if a_norm == b_norm {
        return 1.0;
    }

    jaccard(&tokenize(&a_norm), &tokenize(&b_norm))
}

/// Date score (0-1)
/// score = e^(-days / window)
#[inline]
fn calculate_date_score(days_apart: i64, window_days: f64) -> f64 {
    (-(days_apart as f64) / window_days).exp()
}
