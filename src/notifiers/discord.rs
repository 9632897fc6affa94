use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::config::DiscordConfig;
use crate::notifiers::{format_body, format_subject, NotificationEvent, Notifier};
use crate::utils::error::AppError;

/// Posts price-drop messages to a Discord webhook.
pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook_url: String,
    username: String,
}

impl DiscordNotifier {
    pub fn new(config: &DiscordConfig) -> Result<Self, AppError> {
        let webhook_url = config
            .webhook_url
            .clone()
            .ok_or_else(|| AppError::Notification("discord webhook_url not configured".into()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            webhook_url,
            username: config.username.clone(),
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<(), AppError> {
        let payload = json!({
            "username": self.username,
            "content": format!("**{}**\n{}", format_subject(event), format_body(event)),
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Notification(format!("discord webhook failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Notification(format!(
                "discord webhook returned status {}",
                response.status().as_u16()
            )));
        }

        info!(item_id = %event.item_id, "price drop posted to discord");
        Ok(())
    }
}
