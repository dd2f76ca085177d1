use crate::models::{Item, MatchRecord, MatchStatus, NewMatch, Notification, NotificationRequest, Profile};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by any backing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to lost/found items
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get_item(&self, id: Uuid) -> Result<Option<Item>, StoreError>;

    /// Active items of the opposite category owned by someone else, at most `limit`
    async fn find_candidates(&self, source: &Item, limit: usize) -> Result<Vec<Item>, StoreError>;
}

/// Match records keyed by their normalized (lost, found) pair
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Insert a `pending` record unless one already exists for the pair.
    ///
    /// Returns `None` when the pair was already recorded. Implementations must
    /// make the existence check and the insert a single atomic step.
    async fn insert_if_absent(&self, new_match: NewMatch) -> Result<Option<MatchRecord>, StoreError>;

    /// Non-dismissed matches where `item_id` is either side, best score first
    async fn list_for_item(&self, item_id: Uuid) -> Result<Vec<MatchRecord>, StoreError>;

    async fn update_status(&self, match_id: Uuid, status: MatchStatus) -> Result<Option<MatchRecord>, StoreError>;
}

/// Notification rows and the profile settings that decide email delivery
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, request: &NotificationRequest) -> Result<Notification, StoreError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;
}
