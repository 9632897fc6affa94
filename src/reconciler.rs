use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::{PriceObservation, TrackedItem};
use crate::notifiers::NotificationEvent;

/// Everything the caller must persist and deliver after reconciling one
/// observation: the updated item record, the observation to append, and at
/// most one notification event.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub item: TrackedItem,
    pub observation: PriceObservation,
    pub notification: Option<NotificationEvent>,
}

/// Folds a fresh price into an item and decides whether the drop is
/// notification-worthy.
///
/// A notification fires only when a target is set, the new price is at or
/// below it, AND the price strictly dropped since the last check. The strict
/// drop prevents repeat alerts every sweep while a price sits stably below
/// the target.
pub fn reconcile(
    item: &TrackedItem,
    price: Decimal,
    observed_at: DateTime<Utc>,
) -> ReconcileOutcome {
    let previous_price = item.current_price;

    let mut updated = item.clone();
    updated.apply_observation(price, observed_at);
    let observation = PriceObservation::at(price, observed_at);

    let notification = match item.target_price {
        Some(target) if price <= target && price < previous_price => Some(NotificationEvent {
            item_id: item.id.clone(),
            owner_id: item.owner_id.clone(),
            title: updated.title.clone(),
            url: item.url.clone(),
            store: item.store.clone(),
            previous_price,
            new_price: price,
            target_price: target,
        }),
        _ => None,
    };

    ReconcileOutcome {
        item: updated,
        observation,
        notification,
    }
}

pub fn savings_amount(old_price: Decimal, new_price: Decimal) -> Decimal {
    old_price - new_price
}

/// Whole-number savings percentage, `round((old-new)/old*100)`.
///
/// Non-computable when the old price is zero; callers omit the percentage
/// rather than divide by zero.
pub fn savings_percent(old_price: Decimal, new_price: Decimal) -> Option<i64> {
    if old_price.is_zero() {
        return None;
    }
    ((old_price - new_price) / old_price * Decimal::from(100))
        .round()
        .to_i64()
}
