use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod registry;
pub mod stores;

pub use registry::ExtractorRegistry;

/// Title substituted when a store page carries no recognizable product name.
pub const UNKNOWN_PRODUCT_TITLE: &str = "Unknown Product";

/// Structured fields pulled out of a raw product page.
///
/// A result only exists when a price was resolved; everything else degrades
/// to documented defaults instead of failing the extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    pub price: Decimal,
    pub title: String,
    pub image_url: String,
    pub store: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no extractor registered for host '{host}'")]
    UnknownStore { host: String },

    #[error("invalid item URL '{url}'")]
    InvalidUrl { url: String },

    #[error("{store}: no price could be extracted from the document")]
    PriceNotFound { store: String },
}

/// Store-specific extraction strategy.
///
/// Adding support for a new retail site means implementing this trait and
/// registering it; dispatch never changes.
pub trait StoreExtractor: Send + Sync + std::fmt::Debug {
    /// Short store label used on tracked items and in notifications.
    fn store_name(&self) -> &str;

    /// Whether this strategy handles documents served from `host`.
    fn matches_host(&self, host: &str) -> bool;

    fn extract(&self, document: &str) -> Result<ExtractionResult, ExtractError>;
}
