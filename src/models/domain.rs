use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which side of the lost-and-found board an item was posted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Lost,
    Found,
}

impl ItemCategory {
    /// The category a counterpart item must have
    pub fn opposite(self) -> Self {
        match self {
            ItemCategory::Lost => ItemCategory::Found,
            ItemCategory::Found => ItemCategory::Lost,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemCategory::Lost => "lost",
            ItemCategory::Found => "found",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Claimed,
    Resolved,
}

/// A lost or found report
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ItemCategory,
    pub location: String,
    pub item_date: NaiveDate,
    pub status: ItemStatus,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Confirmed,
    Dismissed,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Confirmed => "confirmed",
            MatchStatus::Dismissed => "dismissed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "pending" => Some(MatchStatus::Pending),
            "confirmed" => Some(MatchStatus::Confirmed),
            "dismissed" => Some(MatchStatus::Dismissed),
            _ => None,
        }
    }
}

/// Lost item first, found item second. Construct through [`MatchPair::normalize`]
/// so the ordering can't be inverted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchPair {
    pub lost_item_id: Uuid,
    pub found_item_id: Uuid,
}

impl MatchPair {
    /// Order a source/candidate pair so the `lost` item comes first
    pub fn normalize(source: &Item, candidate: &Item) -> Self {
        match source.category {
            ItemCategory::Lost => Self {
                lost_item_id: source.id,
                found_item_id: candidate.id,
            },
            ItemCategory::Found => Self {
                lost_item_id: candidate.id,
                found_item_id: source.id,
            },
        }
    }
}

/// Persisted proposal that a lost item and a found item are the same object
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MatchRecord {
    pub id: Uuid,
    pub lost_item_id: Uuid,
    pub found_item_id: Uuid,
    pub match_score: f64,
    pub match_reason: Option<String>,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn pair(&self) -> MatchPair {
        MatchPair {
            lost_item_id: self.lost_item_id,
            found_item_id: self.found_item_id,
        }
    }
}

/// Insert payload for a match record; status is always `pending`
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub pair: MatchPair,
    pub score: f64,
    pub reason: Option<String>,
}

/// One oracle verdict about one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub item_id: String,
    pub score: f64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Match,
    Message,
    StatusChange,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::Match => "match",
            NotificationType::Message => "message",
            NotificationType::StatusChange => "status_change",
        }
    }
}

/// In-app notification row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub item_id: Option<Uuid>,
    pub related_item_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// The slice of a user profile the notifier needs
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_notifications: bool,
}

/// Heuristic scorer weights
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub text: f64,
    pub location: f64,
    pub date: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            text: 0.60,
            location: 0.25,
            date: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(category: ItemCategory) -> Item {
        Item {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "wallet".to_string(),
            description: "black".to_string(),
            category,
            location: "Main St".to_string(),
            item_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            status: ItemStatus::Active,
            image_urls: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_pair_normalized_from_lost_source() {
        let lost = item(ItemCategory::Lost);
        let found = item(ItemCategory::Found);

        let pair = MatchPair::normalize(&lost, &found);
        assert_eq!(pair.lost_item_id, lost.id);
        assert_eq!(pair.found_item_id, found.id);
    }

    #[test]
    fn test_pair_normalized_from_found_source() {
        let lost = item(ItemCategory::Lost);
        let found = item(ItemCategory::Found);

        let pair = MatchPair::normalize(&found, &lost);
        assert_eq!(pair.lost_item_id, lost.id);
        assert_eq!(pair.found_item_id, found.id);
    }

    #[test]
    fn test_category_opposite() {
        assert_eq!(ItemCategory::Lost.opposite(), ItemCategory::Found);
        assert_eq!(ItemCategory::Found.opposite(), ItemCategory::Lost);
    }

    #[test]
    fn test_match_status_parse() {
        assert_eq!(MatchStatus::parse("Confirmed"), Some(MatchStatus::Confirmed));
        assert_eq!(MatchStatus::parse("dismissed"), Some(MatchStatus::Dismissed));
        assert_eq!(MatchStatus::parse("maybe"), None);
    }

    #[test]
    fn test_notification_type_wire_name() {
        let json = serde_json::to_string(&NotificationType::StatusChange).unwrap();
        assert_eq!(json, "\"status_change\"");
    }
}
