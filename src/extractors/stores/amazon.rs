use scraper::Html;

use super::{first_attr, first_text, normalize_price};
use crate::extractors::{ExtractError, ExtractionResult, StoreExtractor, UNKNOWN_PRODUCT_TITLE};

// Amazon has shipped several price block layouts over the years; the
// offscreen span inside the buybox is the current one.
const PRICE_SELECTORS: &[&str] = &[
    "#priceblock_ourprice",
    "#priceblock_dealprice",
    ".a-price .a-offscreen",
];
const TITLE_SELECTORS: &[&str] = &["#productTitle", "#title span"];
const IMAGE_SELECTORS: &[&str] = &["#landingImage", "#imgBlkFront"];

#[derive(Debug)]
pub struct AmazonExtractor;

impl StoreExtractor for AmazonExtractor {
    fn store_name(&self) -> &str {
        "Amazon"
    }

    fn matches_host(&self, host: &str) -> bool {
        host.contains("amazon.")
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
