use rust_decimal::Decimal;
use std::str::FromStr;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricewatch::utils::error::AppError;

use super::{product_page, test_manager};

#[tokio::test]
async fn test_register_seeds_item_and_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widget"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page("Widget Deluxe", "$42.50")),
        )
        .mount(&server)
        .await;

    let manager = test_manager(Vec::new());
    let item = manager
        .register_item(
            &format!("{}/widget", server.uri()),
            Some(Decimal::from(40)),
            "owner-1",
        )
        .await
        .unwrap();

    assert_eq!(item.title, "Widget Deluxe");
    assert_eq!(item.current_price, Decimal::from_str("42.50").unwrap());
    assert_eq!(item.store, "LocalStore");
    assert!(item.is_active);

    let history = manager.store().history(&item.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(
        history.latest().unwrap().price,
        Decimal::from_str("42.50").unwrap()
    );
}

#[tokio::test]
async fn test_register_unknown_store_fails_before_any_request() {
    // No mock server at all; classification must reject the host offline.
    let manager = test_manager(Vec::new());

    let err = manager
        .register_item("https://shop.example.com/item/1", None, "owner-1")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Extract(_)));
    assert!(manager.store().active_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_page_without_price_creates_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h1>No price here</h1></body></html>"),
        )
        .mount(&server)
        .await;

    let manager = test_manager(Vec::new());
    let err = manager
        .register_item(&format!("{}/broken", server.uri()), None, "owner-1")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(manager.store().active_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_malformed_url_rejected() {
    let manager = test_manager(Vec::new());

    let err = manager
        .register_item("not a url at all", None, "owner-1")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Extract(_)));
}
