use crate::models::{Notification, NotificationRequest};
use crate::services::email::{email_html, email_subject, EmailSender, OutgoingEmail};
use crate::services::store::{NotificationStore, StoreError};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while delivering a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to store notification: {0}")]
    StoreError(#[from] StoreError),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Notification sink returned error: {0}")]
    ApiError(String),
}

/// Delivers a single notification to one user
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError>;
}

/// In-process notification sink
///
/// Persists the in-app row, then emails the recipient when their profile
/// has email notifications enabled. Only the row insert can fail the call;
/// profile lookups and email delivery are best-effort.
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    email: Arc<dyn EmailSender>,
    app_url: String,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>, email: Arc<dyn EmailSender>, app_url: String) -> Self {
        Self { store, email, app_url }
    }

    /// Store the notification and attempt the email; returns the stored row
    pub async fn deliver(&self, request: &NotificationRequest) -> Result<Notification, NotifyError> {
        let notification = self.store.insert_notification(request).await.map_err(|e| {
            tracing::error!("Error creating notification for {}: {}", request.user_id, e);
            e
        })?;

        if !request.wants_email() {
            return Ok(notification);
        }

        let profile = match self.store.get_profile(request.user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Error fetching profile for {}: {}", request.user_id, e);
                None
            }
        };

        let Some(profile) = profile.filter(|p| p.email_notifications) else {
            return Ok(notification);
        };

        let email = OutgoingEmail {
            to: profile.email.clone(),
            subject: email_subject(request.notification_type, &request.title),
            html: email_html(
                request.notification_type,
                &request.title,
                &request.message,
                &profile.name,
                &self.app_url,
            ),
        };

        if let Err(e) = self.email.send(&email).await {
            tracing::warn!("Error sending email to {}: {}", request.user_id, e);
        }

        Ok(notification)
    }
}

#[async_trait]
impl Notifier for NotificationService {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError> {
        self.deliver(request).await.map(|_| ())
    }
}

/// Forwards notifications to a remote sink over HTTP
pub struct HttpNotifier {
    endpoint: String,
    service_key: String,
    client: Client,
}

impl HttpNotifier {
    pub fn new(endpoint: String, service_key: String, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            service_key,
            client,
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.service_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(NotifyError::ApiError(format!("{} - {}", status, body)));
        }

        tracing::debug!("Forwarded notification for {}", request.user_id);
        Ok(())
    }
}
