use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::generate_id;

/// A product being watched on a third-party retail site.
///
/// Created on first successful extraction at registration time and mutated
/// only through [`apply_observation`](TrackedItem::apply_observation) during
/// sweeps. Items are soft-deleted (`is_active = false`) so their price
/// history survives removal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackedItem {
    pub id: String,
    pub url: String,
    pub title: String,
    pub current_price: Decimal,
    pub target_price: Option<Decimal>,
    pub store: String,
    pub image_url: String,
    pub is_active: bool,
    pub last_checked: Option<DateTime<Utc>>,

    // Opaque owner reference; no behavior coupling to account storage
    pub owner_id: String,

    // Metadata
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrackedItem {
    pub url: String,
    pub title: String,
    pub price: Decimal,
    pub target_price: Option<Decimal>,
    pub store: String,
    pub image_url: String,
    pub owner_id: String,
}

impl TrackedItem {
    pub fn new(new_item: NewTrackedItem) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            url: new_item.url,
            title: new_item.title,
            current_price: new_item.price,
            target_price: new_item.target_price,
            store: new_item.store,
            image_url: new_item.image_url,
            is_active: true,
            last_checked: Some(now),
            owner_id: new_item.owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Folds a fresh price observation into the record.
    pub fn apply_observation(&mut self, price: Decimal, observed_at: DateTime<Utc>) {
        self.current_price = price;
        self.last_checked = Some(observed_at);
        self.updated_at = observed_at;
    }

    /// Soft delete. History stays behind for the lifetime of the record.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}
