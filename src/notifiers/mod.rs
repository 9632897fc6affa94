pub mod discord;
pub mod email;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::reconciler::{savings_amount, savings_percent};
use crate::utils::error::AppError;

pub use discord::DiscordNotifier;
pub use email::EmailNotifier;

/// A qualifying price drop, carrying everything a channel needs to render
/// a message without another store lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub item_id: String,
    pub owner_id: String,
    pub title: String,
    pub url: String,
    pub store: String,
    pub previous_price: Decimal,
    pub new_price: Decimal,
    pub target_price: Decimal,
}

/// Delivery channel for price-drop events. Channels must not panic; a
/// failed delivery is logged by the caller and never blocks the sweep.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, event: &NotificationEvent) -> Result<(), AppError>;
}

pub fn format_subject(event: &NotificationEvent) -> String {
    format!("Price drop: {} is now {}", event.title, event.new_price)
}

/// Plain-text body shared by all channels. The savings percentage is
/// omitted when the previous price was zero.
pub fn format_body(event: &NotificationEvent) -> String {
    let mut body = format!(
        "{title} dropped from {old} to {new} on {store} (target: {target}).\n{url}",
        title = event.title,
        old = event.previous_price,
        new = event.new_price,
        store = event.store,
        target = event.target_price,
        url = event.url,
    );

    if let Some(percent) = savings_percent(event.previous_price, event.new_price) {
        let amount = savings_amount(event.previous_price, event.new_price);
        body.push_str(&format!("\nYou save {amount} ({percent}% off)."));
    }

    body
}
