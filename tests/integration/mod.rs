mod registration_tests;
mod scheduler_tests;
mod sweep_tests;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tokio::sync::Mutex;

use pricewatch::config::FetcherConfig;
use pricewatch::extractors::stores::normalize_price;
use pricewatch::extractors::{
    ExtractError, ExtractionResult, ExtractorRegistry, StoreExtractor, UNKNOWN_PRODUCT_TITLE,
};
use pricewatch::fetcher::Fetcher;
use pricewatch::item_manager::ItemManager;
use pricewatch::notifiers::{NotificationEvent, Notifier};
use pricewatch::store::MemoryStore;
use pricewatch::sweep::Pacer;
use pricewatch::utils::error::AppError;

pub fn test_fetcher_config() -> FetcherConfig {
    FetcherConfig {
        request_timeout: 5,
        user_agent: "PricewatchTest/1.0".to_string(),
        retry_attempts: 0,
        retry_delay_ms: 10,
    }
}

/// Extractor for locally served fixture pages, so mock-server URLs classify
/// like any other store.
#[derive(Debug)]
pub struct LocalStoreExtractor;

impl StoreExtractor for LocalStoreExtractor {
    fn store_name(&self) -> &str {
        "LocalStore"
    }

    fn matches_host(&self, host: &str) -> bool {
        host == "127.0.0.1" || host == "localhost"
    }

    fn extract(&self, document: &str) -> Result<ExtractionResult, ExtractError> {
        let document = Html::parse_document(document);
        let select = |css: &str| {
            let selector = Selector::parse(css).ok()?;
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        };

        let price = select(".price")
            .and_then(|raw| normalize_price(&raw))
            .ok_or_else(|| ExtractError::PriceNotFound {
                store: self.store_name().to_string(),
            })?;
        let title = select("h1").unwrap_or_else(|| UNKNOWN_PRODUCT_TITLE.to_string());

        Ok(ExtractionResult {
            price,
            title,
            image_url: String::new(),
            store: self.store_name().to_string(),
        })
    }
}

pub fn test_registry() -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::with_default_stores();
    registry.register(Box::new(LocalStoreExtractor));
    registry
}

pub fn product_page(title: &str, price: &str) -> String {
    format!(
        r#"<html><body><h1>{title}</h1><span class="price">{price}</span></body></html>"#
    )
}

/// Records requested pauses without sleeping, so sweeps finish instantly.
#[derive(Default)]
pub struct RecordingPacer {
    pub pauses: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, delay: Duration) {
        self.pauses.lock().await.push(delay);
    }
}

/// Records pauses and actually sleeps a little, to hold sweeps open long
/// enough for overlap tests.
#[derive(Default)]
pub struct SlowPacer {
    pub pauses: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Pacer for SlowPacer {
    async fn pause(&self, _delay: Duration) {
        self.pauses.lock().await.push(_delay);
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

#[derive(Default)]
pub struct CountingNotifier {
    pub events: Mutex<Vec<NotificationEvent>>,
}

#[async_trait]
impl Notifier for CountingNotifier {
    fn name(&self) -> &str {
        "counting"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<(), AppError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    fn name(&self) -> &str {
        "failing"
    }

    async fn notify(&self, _event: &NotificationEvent) -> Result<(), AppError> {
        Err(AppError::Notification("channel unavailable".into()))
    }
}

pub fn test_manager(notifiers: Vec<Arc<dyn Notifier>>) -> Arc<ItemManager> {
    let fetcher = Fetcher::new(test_fetcher_config()).expect("fetcher");
    Arc::new(ItemManager::new(
        fetcher,
        test_registry(),
        Arc::new(MemoryStore::new()),
        notifiers,
    ))
}
