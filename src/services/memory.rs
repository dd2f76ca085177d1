use crate::models::{
    Item, ItemStatus, MatchRecord, MatchStatus, NewMatch, Notification, NotificationRequest, Profile,
};
use crate::services::store::{ItemStore, MatchStore, NotificationStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    items: Vec<Item>,
    matches: Vec<MatchRecord>,
    notifications: Vec<Notification>,
    profiles: Vec<Profile>,
    writes: usize,
}

/// In-process store for local runs without PostgreSQL and for tests
///
/// Every operation takes the single table lock, so `insert_if_absent`
/// is atomic the same way the unique constraint makes it atomic in
/// PostgreSQL.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_item(&self, item: Item) {
        self.tables.lock().await.items.push(item);
    }

    pub async fn add_profile(&self, profile: Profile) {
        self.tables.lock().await.profiles.push(profile);
    }

    pub async fn matches(&self) -> Vec<MatchRecord> {
        self.tables.lock().await.matches.clone()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.tables.lock().await.notifications.clone()
    }

    /// Number of successful writes (match inserts, status updates, notifications)
    pub async fn write_count(&self) -> usize {
        self.tables.lock().await.writes
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn get_item(&self, id: Uuid) -> Result<Option<Item>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.items.iter().find(|i| i.id == id).cloned())
    }

    async fn find_candidates(&self, source: &Item, limit: usize) -> Result<Vec<Item>, StoreError> {
        let tables = self.tables.lock().await;
        let wanted = source.category.opposite();

        Ok(tables
            .items
            .iter()
            .filter(|i| i.category == wanted)
            .filter(|i| i.status == ItemStatus::Active)
            .filter(|i| i.user_id != source.user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn insert_if_absent(&self, new_match: NewMatch) -> Result<Option<MatchRecord>, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.matches.iter().any(|m| m.pair() == new_match.pair) {
            return Ok(None);
        }

        let record = MatchRecord {
            id: Uuid::new_v4(),
            lost_item_id: new_match.pair.lost_item_id,
            found_item_id: new_match.pair.found_item_id,
            match_score: new_match.score,
            match_reason: new_match.reason,
            status: MatchStatus::Pending,
            created_at: Utc::now(),
        };

        tables.matches.push(record.clone());
        tables.writes += 1;

        Ok(Some(record))
    }

    async fn list_for_item(&self, item_id: Uuid) -> Result<Vec<MatchRecord>, StoreError> {
        let tables = self.tables.lock().await;

        let mut records: Vec<MatchRecord> = tables
            .matches
            .iter()
            .filter(|m| m.lost_item_id == item_id || m.found_item_id == item_id)
            .filter(|m| m.status != MatchStatus::Dismissed)
            .cloned()
            .collect();

        records.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(records)
    }

    async fn update_status(&self, match_id: Uuid, status: MatchStatus) -> Result<Option<MatchRecord>, StoreError> {
        let mut tables = self.tables.lock().await;

        let updated = match tables.matches.iter_mut().find(|m| m.id == match_id) {
            Some(record) => {
                record.status = status;
                Some(record.clone())
            }
            None => None,
        };

        if updated.is_some() {
            tables.writes += 1;
        }

        Ok(updated)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, request: &NotificationRequest) -> Result<Notification, StoreError> {
        let mut tables = self.tables.lock().await;

        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            notification_type: request.notification_type,
            title: request.title.clone(),
            message: request.message.clone(),
            item_id: request.item_id,
            related_item_id: request.related_item_id,
            is_read: false,
            created_at: Utc::now(),
        };

        tables.notifications.push(notification.clone());
        tables.writes += 1;

        Ok(notification)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.profiles.iter().find(|p| p.id == user_id).cloned())
    }
}
