// Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use back2u_match::core::{MatchScorer, ScoringError};
use back2u_match::models::{
    Item, ItemCategory, ItemStatus, MatchRecord, MatchStatus, NewMatch, Notification,
    NotificationRequest, Profile, ScoredCandidate,
};
use back2u_match::services::{
    ItemStore, MatchStore, MemoryStore, NotificationStore, Notifier, NotifyError, StoreError,
};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub fn create_test_item(
    title: &str,
    category: ItemCategory,
    location: &str,
    date: (i32, u32, u32),
) -> Item {
    Item {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        title: title.to_string(),
        description: format!("{} reported near {}", title, location),
        category,
        location: location.to_string(),
        item_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        status: ItemStatus::Active,
        image_urls: vec![],
        created_at: Utc::now(),
    }
}

/// Scorer double answering every call with the same entries, unfiltered:
/// unknown ids and out-of-range scores reach the pipeline as given.
pub struct FixedScorer {
    entries: Vec<ScoredCandidate>,
    seen: Mutex<Vec<usize>>,
}

impl FixedScorer {
    pub fn new(entries: Vec<(String, f64, &str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(item_id, score, reason)| ScoredCandidate {
                    item_id,
                    score,
                    reason: reason.to_string(),
                })
                .collect(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Number of candidates passed on each call
    pub fn calls(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl MatchScorer for FixedScorer {
    async fn score(&self, _source: &Item, candidates: &[Item]) -> Result<Vec<ScoredCandidate>, ScoringError> {
        self.seen.lock().unwrap().push(candidates.len());
        Ok(self.entries.clone())
    }
}

/// Oracle double that always fails
pub struct FailingScorer {
    pub rate_limited: bool,
}

#[async_trait]
impl MatchScorer for FailingScorer {
    async fn score(&self, _source: &Item, _candidates: &[Item]) -> Result<Vec<ScoredCandidate>, ScoringError> {
        if self.rate_limited {
            Err(ScoringError::RateLimited)
        } else {
            Err(ScoringError::Unavailable("AI API error: 500".to_string()))
        }
    }
}

/// Notifier double recording every attempt; fails for selected recipients
#[derive(Default)]
pub struct RecordingNotifier {
    attempts: Mutex<Vec<NotificationRequest>>,
    failing: Mutex<HashSet<Uuid>>,
}

impl RecordingNotifier {
    pub fn fail_for(&self, user_id: Uuid) {
        self.failing.lock().unwrap().insert(user_id);
    }

    pub fn attempts(&self) -> Vec<NotificationRequest> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError> {
        self.attempts.lock().unwrap().push(request.clone());
        if self.failing.lock().unwrap().contains(&request.user_id) {
            return Err(NotifyError::ApiError("sink unavailable".to_string()));
        }
        Ok(())
    }
}

/// Store wrapper that injects write failures in front of a [`MemoryStore`]
pub struct FaultyStore {
    inner: Arc<MemoryStore>,
    match_insert_budget: Mutex<Option<usize>>,
    failing_recipients: Mutex<HashSet<Uuid>>,
}

impl FaultyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            match_insert_budget: Mutex::new(None),
            failing_recipients: Mutex::new(HashSet::new()),
        }
    }

    /// Let `n` more match inserts through, then fail every following one
    pub fn fail_match_inserts_after(&self, n: usize) {
        *self.match_insert_budget.lock().unwrap() = Some(n);
    }

    /// Reject notification inserts addressed to `user_id`
    pub fn fail_notifications_for(&self, user_id: Uuid) {
        self.failing_recipients.lock().unwrap().insert(user_id);
    }
}

#[async_trait]
impl ItemStore for FaultyStore {
    async fn get_item(&self, id: Uuid) -> Result<Option<Item>, StoreError> {
        self.inner.get_item(id).await
    }

    async fn find_candidates(&self, source: &Item, limit: usize) -> Result<Vec<Item>, StoreError> {
        self.inner.find_candidates(source, limit).await
    }
}

#[async_trait]
impl MatchStore for FaultyStore {
    async fn insert_if_absent(&self, new_match: NewMatch) -> Result<Option<MatchRecord>, StoreError> {
        if let Some(budget) = self.match_insert_budget.lock().unwrap().as_mut() {
            if *budget == 0 {
                return Err(StoreError::Unavailable("match insert rejected".to_string()));
            }
            *budget -= 1;
        }
        self.inner.insert_if_absent(new_match).await
    }

    async fn list_for_item(&self, item_id: Uuid) -> Result<Vec<MatchRecord>, StoreError> {
        self.inner.list_for_item(item_id).await
    }

    async fn update_status(&self, match_id: Uuid, status: MatchStatus) -> Result<Option<MatchRecord>, StoreError> {
        self.inner.update_status(match_id, status).await
    }
}

#[async_trait]
impl NotificationStore for FaultyStore {
    async fn insert_notification(&self, request: &NotificationRequest) -> Result<Notification, StoreError> {
        if self.failing_recipients.lock().unwrap().contains(&request.user_id) {
            return Err(StoreError::Unavailable(format!(
                "notification insert rejected for {}",
                request.user_id
            )));
        }
        self.inner.insert_notification(request).await
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        self.inner.get_profile(user_id).await
    }
}
