use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use crate::models::domain::NotificationType;

/// Request to run the matching pipeline for one item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesRequest {
    #[serde(alias = "item_id", rename = "itemId")]
    pub item_id: String,
}

/// Request to deliver one notification (in-app row plus optional email)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotificationRequest {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: Uuid,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(alias = "item_id", rename = "itemId", default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,
    #[serde(alias = "related_item_id", rename = "relatedItemId", default, skip_serializing_if = "Option::is_none")]
    pub related_item_id: Option<Uuid>,
    #[serde(alias = "send_email", rename = "sendEmail", default)]
    pub send_email: Option<bool>,
}

impl NotificationRequest {
    /// Email goes out unless the caller explicitly opted out
    pub fn wants_email(&self) -> bool {
        self.send_email != Some(false)
    }
}

/// Request to confirm or dismiss a match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMatchStatusRequest {
    #[validate(length(min = 1))]
    pub status: String,
}

/// Query string for listing matches of an item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMatchesQuery {
    #[serde(alias = "item_id", rename = "itemId")]
    pub item_id: Uuid,
}
