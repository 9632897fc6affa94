use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Selector};

mod amazon;
mod ebay;
mod walmart;

pub use amazon::AmazonExtractor;
pub use ebay::EbayExtractor;
pub use walmart::WalmartExtractor;

/// Normalizes a raw price string by stripping everything that is not a digit
/// or a decimal point, then parsing the remainder.
///
/// "$1,299.99" and "1299.99" normalize to the same value. Returns `None` for
/// strings with no parseable number left after stripping.
pub fn normalize_price(raw: &str) -> Option<Decimal> {
    static NON_NUMERIC: OnceLock<Regex> = OnceLock::new();
    let pattern = NON_NUMERIC.get_or_init(|| Regex::new(r"[^0-9.]").unwrap());

    let cleaned = pattern.replace_all(raw, "");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// First non-empty text content among `selectors`, tried in order.
pub(crate) fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// First non-empty attribute value among `selectors`, tried in order.
pub(crate) fn first_attr(document: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attr) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}
