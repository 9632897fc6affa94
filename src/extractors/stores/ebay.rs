use scraper::Html;

use super::{first_attr, first_text, normalize_price};
use crate::extractors::{ExtractError, ExtractionResult, StoreExtractor, UNKNOWN_PRODUCT_TITLE};

const PRICE_SELECTORS: &[&str] = &[".x-price-primary .ux-textspans", "#prcIsum"];
const TITLE_SELECTORS: &[&str] = &[".x-item-title__mainTitle .ux-textspans", "#itemTitle"];
const IMAGE_SELECTORS: &[&str] = &[".ux-image-carousel-item img", "#icImg"];

#[derive(Debug)]
pub struct EbayExtractor;

impl StoreExtractor for EbayExtractor {
    fn store_name(&self) -> &str {
        "eBay"
    }

    fn matches_host(&self, host: &str) -> bool {
        host.contains("ebay.")
    }

    fn extract(&self, document: &str) -> Result<ExtractionResult, ExtractError> {
        let document = Html::parse_document(document);

        let price = first_text(&document, PRICE_SELECTORS)
            .and_then(|raw| normalize_price(&raw))
            .ok_or_else(|| ExtractError::PriceNotFound {
                store: self.store_name().to_string(),
            })?;

        let title = first_text(&document, TITLE_SELECTORS)
            .unwrap_or_else(|| UNKNOWN_PRODUCT_TITLE.to_string());
        let image_url = first_attr(&document, IMAGE_SELECTORS, "src").unwrap_or_default();

        Ok(ExtractionResult {
            price,
            title,
            image_url,
            store: self.store_name().to_string(),
        })
    }
}
