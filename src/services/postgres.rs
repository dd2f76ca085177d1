use crate::models::{
    Item, MatchRecord, MatchStatus, NewMatch, Notification, NotificationRequest, Profile,
};
use crate::services::store::{ItemStore, MatchStore, NotificationStore, StoreError};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

const ITEM_COLUMNS: &str = r#"
    id, user_id, title, description, category, location, item_date, status,
    image_urls, created_at
"#;

const MATCH_COLUMNS: &str = r#"
    id, lost_item_id, found_item_id, match_score, match_reason, status, created_at
"#;

/// PostgreSQL-backed store for items, matches, notifications and profiles
///
/// The `item_matches` table carries a unique constraint on
/// `(lost_item_id, found_item_id)`, which is what makes
/// [`MatchStore::insert_if_absent`] race-free across concurrent requests.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl ItemStore for PostgresClient {
    async fn get_item(&self, id: Uuid) -> Result<Option<Item>, StoreError> {
        let query = format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS);

        let item = sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    async fn find_candidates(&self, source: &Item, limit: usize) -> Result<Vec<Item>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM items
            WHERE category = $1
              AND status = 'active'
              AND user_id <> $2
            LIMIT $3
            "#,
            ITEM_COLUMNS
        );

        let items = sqlx::query_as::<_, Item>(&query)
            .bind(source.category.opposite())
            .bind(source.user_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Fetched {} candidates for item {}", items.len(), source.id);

        Ok(items)
    }
}

#[async_trait]
impl MatchStore for PostgresClient {
    /// Uses INSERT ... ON CONFLICT DO NOTHING against the pair constraint.
    /// No row comes back when the pair already existed.
    async fn insert_if_absent(&self, new_match: NewMatch) -> Result<Option<MatchRecord>, StoreError> {
        let query = format!(
            r#"
            INSERT INTO item_matches (lost_item_id, found_item_id, match_score, match_reason, status)
            VALUES ($1, $2, $3, $4, 'pending')
            ON CONFLICT (lost_item_id, found_item_id) DO NOTHING
            RETURNING {}
            "#,
            MATCH_COLUMNS
        );

        let record = sqlx::query_as::<_, MatchRecord>(&query)
            .bind(new_match.pair.lost_item_id)
            .bind(new_match.pair.found_item_id)
            .bind(new_match.score)
            .bind(&new_match.reason)
            .fetch_optional(&self.pool)
            .await?;

        match &record {
            Some(r) => tracing::debug!(
                "Recorded match {}: {} <-> {} ({:.2})",
                r.id,
                r.lost_item_id,
                r.found_item_id,
                r.match_score
            ),
            None => tracing::debug!(
                "Match {} <-> {} already recorded",
                new_match.pair.lost_item_id,
                new_match.pair.found_item_id
            ),
        }

        Ok(record)
    }

    async fn list_for_item(&self, item_id: Uuid) -> Result<Vec<MatchRecord>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM item_matches
            WHERE (lost_item_id = $1 OR found_item_id = $1)
              AND status <> 'dismissed'
            ORDER BY match_score DESC
            "#,
            MATCH_COLUMNS
        );

        let records = sqlx::query_as::<_, MatchRecord>(&query)
            .bind(item_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn update_status(&self, match_id: Uuid, status: MatchStatus) -> Result<Option<MatchRecord>, StoreError> {
        let query = format!(
            "UPDATE item_matches SET status = $2 WHERE id = $1 RETURNING {}",
            MATCH_COLUMNS
        );

        let record = sqlx::query_as::<_, MatchRecord>(&query)
            .bind(match_id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }
}

#[async_trait]
impl NotificationStore for PostgresClient {
    async fn insert_notification(&self, request: &NotificationRequest) -> Result<Notification, StoreError> {
        let query = r#"
            INSERT INTO notifications (user_id, type, title, message, item_id, related_item_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, is_read, created_at
        "#;

        let row = sqlx::query(query)
            .bind(request.user_id)
            .bind(request.notification_type.as_str())
            .bind(&request.title)
            .bind(&request.message)
            .bind(request.item_id)
            .bind(request.related_item_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Notification {
            id: row.get("id"),
            user_id: request.user_id,
            notification_type: request.notification_type,
            title: request.title.clone(),
            message: request.message.clone(),
            item_id: request.item_id,
            related_item_id: request.related_item_id,
            is_read: row.get("is_read"),
            created_at: row.get("created_at"),
        })
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let query = r#"
            SELECT id, name, email, email_notifications
            FROM profiles
            WHERE id = $1
        "#;

        let profile = sqlx::query_as::<_, Profile>(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }
}
