use crate::models::NotificationType;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when sending email
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Email API returned error: {0}")]
    ApiError(String),

    #[error("Email delivery is not configured")]
    Disabled,
}

/// A rendered message ready to hand to a provider
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

/// Resend REST API client
pub struct ResendClient {
    api_url: String,
    api_key: String,
    from: String,
    client: Client,
}

#[derive(Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendClient {
    pub fn new(api_url: String, api_key: String, from: String) -> Result<Self, EmailError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            api_url,
            api_key,
            from,
            client,
        })
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let url = format!("{}/emails", self.api_url.trim_end_matches('/'));

        let payload = ResendPayload {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(EmailError::ApiError(format!("{} - {}", status, body)));
        }

        tracing::debug!("Email sent to {}", email.to);
        Ok(())
    }
}

/// Sender used when no provider key is configured
pub struct DisabledEmail;

#[async_trait]
impl EmailSender for DisabledEmail {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), EmailError> {
        Err(EmailError::Disabled)
    }
}

/// Subject line per notification type
pub fn email_subject(notification_type: NotificationType, title: &str) -> String {
    match notification_type {
        NotificationType::Match => format!("🎉 {} - Back2U", title),
        NotificationType::Message => "💬 New Message - Back2U".to_string(),
        NotificationType::StatusChange => format!("📋 {} - Back2U", title),
    }
}

fn icon(notification_type: NotificationType) -> &'static str {
    match notification_type {
        NotificationType::Match => "🎉",
        NotificationType::Message => "💬",
        NotificationType::StatusChange => "📋",
    }
}

/// Render the notification email body
///
/// `app_url` is the public site root; the body links to its dashboard and
/// profile pages.
pub fn email_html(
    notification_type: NotificationType,
    title: &str,
    message: &str,
    user_name: &str,
    app_url: &str,
) -> String {
    let name = if user_name.trim().is_empty() { "there" } else { user_name };
    let app_url = app_url.trim_end_matches('/');

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="background: #667eea; padding: 30px; border-radius: 10px 10px 0 0; text-align: center;">
    <h1 style="color: white; margin: 0; font-size: 28px;">Back2U</h1>
    <p style="color: rgba(255,255,255,0.9); margin: 10px 0 0 0;">Lost &amp; Found Portal</p>
  </div>
  <div style="background: #ffffff; padding: 30px; border: 1px solid #e5e7eb; border-top: none; border-radius: 0 0 10px 10px;">
    <p style="font-size: 18px; margin-bottom: 20px;">Hi {name}!</p>
    <div style="background: #f8fafc; padding: 20px; border-radius: 8px; border-left: 4px solid #667eea;">
      <h2 style="margin: 0 0 10px 0; font-size: 20px;">{icon} {title}</h2>
      <p style="margin: 0; color: #4b5563;">{message}</p>
    </div>
    <div style="margin-top: 30px; text-align: center;">
      <a href="{app_url}/dashboard" style="display: inline-block; background: #667eea; color: white; padding: 12px 30px; text-decoration: none; border-radius: 6px; font-weight: 600;">View on Back2U</a>
    </div>
    <hr style="border: none; border-top: 1px solid #e5e7eb; margin: 30px 0;">
    <p style="font-size: 12px; color: #9ca3af; text-align: center;">
      You're receiving this email because you have notifications enabled on Back2U.<br>
      <a href="{app_url}/profile" style="color: #667eea;">Manage your notification preferences</a>
    </p>
  </div>
</body>
</html>
"#,
        name = escape_html(name),
        icon = icon(notification_type),
        title = escape_html(title),
        message = escape_html(message),
        app_url = app_url,
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
