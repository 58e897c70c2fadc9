//! Push notifications to the project owner through the hosted notification
//! service.

use reqwest::Client;
use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;

pub const TITLE_MAX_LENGTH: usize = 1200;
pub const CONTENT_MAX_LENGTH: usize = 20000;

const SEND_NOTIFICATION_PATH: &str = "webdevtoken.v1.WebDevService/SendNotification";

#[derive(Debug, Serialize)]
struct NotificationPayload<'a> {
    title: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    client: Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

/// Trims both fields and enforces the service's length limits.
pub fn validate_notification(title: &str, content: &str) -> Result<(String, String), ApiError> {
    let title = title.trim();
    let content = content.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Notification title is required.".into()));
    }
    if content.is_empty() {
        return Err(ApiError::BadRequest("Notification content is required.".into()));
    }
    if title.chars().count() > TITLE_MAX_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Notification title must be at most {TITLE_MAX_LENGTH} characters."
        )));
    }
    if content.chars().count() > CONTENT_MAX_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Notification content must be at most {CONTENT_MAX_LENGTH} characters."
        )));
    }
    Ok((title.to_string(), content.to_string()))
}

impl Notifier {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Self {
        let base_url = base_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string());
        if base_url.is_none() {
            warn!("BUILT_IN_FORGE_API_URL is not set; owner notifications are unavailable");
        }
        Self {
            client: Client::new(),
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Returns whether the service accepted the notification. Delivery
    /// failures are logged and reported as `false`; invalid input and missing
    /// configuration are errors.
    pub async fn notify_owner(&self, title: &str, content: &str) -> Result<bool, ApiError> {
        let (title, content) = validate_notification(title, content)?;

        let base_url = self
            .base_url
            .as_ref()
            .ok_or_else(|| ApiError::Internal("Notification service URL is not configured.".into()))?;
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("Notification service API key is not configured.".into()))?;

        let url = format!("{base_url}/{SEND_NOTIFICATION_PATH}");
        let result = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("accept", "application/json")
            .header("connect-protocol-version", "1")
            .json(&NotificationPayload { title: &title, content: &content })
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => Ok(true),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!("Failed to notify owner ({}): {}", status, body);
                Ok(false)
            }
            Err(e) => {
                warn!("Error calling notification service: {}", e);
                Ok(false)
            }
        }
    }
}
