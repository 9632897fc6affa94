use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::extractors::ExtractorRegistry;
use crate::fetcher::Fetcher;
use crate::models::{NewTrackedItem, PriceObservation, TrackedItem};
use crate::notifiers::Notifier;
use crate::reconciler;
use crate::store::PriceStore;
use crate::utils::error::AppError;

/// Outcome of checking a single item during a sweep.
#[derive(Debug, Clone)]
pub struct ItemCheckResult {
    pub item_id: String,
    pub previous_price: Decimal,
    pub new_price: Decimal,
    pub notified: bool,
}

/// Orchestrates the fetch -> extract -> reconcile -> persist pipeline for
/// individual items, both at registration time and during sweeps.
pub struct ItemManager {
    fetcher: Fetcher,
    registry: ExtractorRegistry,
    store: Arc<dyn PriceStore>,
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl ItemManager {
    pub fn new(
        fetcher: Fetcher,
        registry: ExtractorRegistry,
        store: Arc<dyn PriceStore>,
        notifiers: Vec<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            fetcher,
            registry,
            store,
            notifiers,
        }
    }

    pub fn store(&self) -> Arc<dyn PriceStore> {
        Arc::clone(&self.store)
    }

    /// Registers a URL for tracking. Classification happens before any
    /// network call so an unsupported store fails fast and offline.
    pub async fn register_item(
        &self,
        url: &str,
        target_price: Option<Decimal>,
        owner_id: &str,
    ) -> Result<TrackedItem, AppError> {
        let extractor = self.registry.classify(url)?;
        let store_name = extractor.store_name().to_string();

        let document = self.fetcher.fetch(url).await?;
        let extracted = extractor.extract(&document).map_err(|e| {
            AppError::Validation(format!("unable to extract product data; check the URL ({e})"))
        })?;

        let item = TrackedItem::new(NewTrackedItem {
            url: url.to_string(),
            title: extracted.title,
            price: extracted.price,
            target_price,
            store: store_name,
            image_url: extracted.image_url,
            owner_id: owner_id.to_string(),
        });
        let seed = PriceObservation::at(item.current_price, item.created_at);
        self.store.insert_item(&item, &seed).await?;

        info!(
            item_id = %item.id,
            store = %item.store,
            price = %item.current_price,
            "registered new tracked item"
        );
        Ok(item)
    }

    /// Re-checks one item: fetches the page, extracts the current price,
    /// reconciles against the stored state, and persists the observation.
    /// Notification failures are logged and never fail the check.
    pub async fn check_item(&self, item: &TrackedItem) -> Result<ItemCheckResult, AppError> {
        let extractor = self.registry.classify(&item.url)?;
        let document = self.fetcher.fetch(&item.url).await?;
        let extracted = extractor.extract(&document)?;

        let outcome = reconciler::reconcile(item, extracted.price, Utc::now());
        self.store
            .commit_observation(&outcome.item, &outcome.observation)
            .await?;

        let mut notified = false;
        if let Some(event) = &outcome.notification {
            for notifier in &self.notifiers {
                match notifier.notify(event).await {
                    Ok(()) => notified = true,
                    Err(e) => {
                        warn!(
                            channel = notifier.name(),
                            item_id = %item.id,
                            error = %e,
                            "notification delivery failed"
                        );
                    }
                }
            }
            // The drop still counts as notified when no channels are
            // configured; the event was produced and persisted state moved on.
            if self.notifiers.is_empty() {
                notified = true;
            }
        }

        Ok(ItemCheckResult {
            item_id: item.id.clone(),
            previous_price: item.current_price,
            new_price: extracted.price,
            notified,
        })
    }
}
