use url::Url;

use super::stores::{AmazonExtractor, EbayExtractor, WalmartExtractor};
use super::{ExtractError, ExtractionResult, StoreExtractor};

/// Polymorphic set of per-store extraction strategies keyed by a host
/// classifier derived from the item URL.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn StoreExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Registry pre-loaded with the built-in store strategies.
    pub fn with_default_stores() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(AmazonExtractor));
        registry.register(Box::new(EbayExtractor));
        registry.register(Box::new(WalmartExtractor));
        registry
    }

    pub fn register(&mut self, extractor: Box<dyn StoreExtractor>) {
        self.extractors.push(extractor);
    }

    /// Resolves the strategy responsible for `url`, or an unknown-store failure.
    pub fn classify(&self, url: &str) -> Result<&dyn StoreExtractor, ExtractError> {
        let parsed = Url::parse(url).map_err(|_| ExtractError::InvalidUrl {
            url: url.to_string(),
        })?;
        let host = parsed
            .host_str()
            .ok_or_else(|| ExtractError::InvalidUrl {
                url: url.to_string(),
            })?;

        self.extractors
            .iter()
            .find(|extractor| extractor.matches_host(host))
            .map(|boxed| boxed.as_ref())
            .ok_or_else(|| ExtractError::UnknownStore {
                host: host.to_string(),
            })
    }

    pub fn extract(&self, url: &str, document: &str) -> Result<ExtractionResult, ExtractError> {
        self.classify(url)?.extract(document)
    }

    pub fn store_names(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.store_name()).collect()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
