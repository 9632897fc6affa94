use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricewatch::sweep::SweepRunner;

use super::{product_page, test_manager, CountingNotifier, FailingNotifier, RecordingPacer};

async fn mount_page(server: &MockServer, route: &str, title: &str, price: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page(title, price)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_one_bad_item_does_not_stop_the_sweep() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", "Item A", "$10.00").await;
    mount_page(&server, "/b", "Item B", "$20.00").await;
    mount_page(&server, "/c", "Item C", "$30.00").await;

    let manager = test_manager(Vec::new());
    for route in ["/a", "/b", "/c"] {
        manager
            .register_item(&format!("{}{route}", server.uri()), None, "owner-1")
            .await
            .unwrap();
    }

    // Middle item starts failing; its neighbors must still be checked.
    server.reset().await;
    mount_page(&server, "/a", "Item A", "$9.00").await;
    mount_page(&server, "/c", "Item C", "$29.00").await;

    let runner = SweepRunner::with_pacer(
        Arc::clone(&manager),
        Duration::from_secs(2),
        Arc::new(RecordingPacer::default()),
    );
    let report = runner.run_sweep().await;

    assert_eq!(report.items_checked, 3);
    assert_eq!(report.items_succeeded, 2);
    assert_eq!(report.items_failed, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("404"));
}

#[tokio::test]
async fn test_items_are_paced_with_configured_delay() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", "Item A", "$10.00").await;
    mount_page(&server, "/b", "Item B", "$20.00").await;
    mount_page(&server, "/c", "Item C", "$30.00").await;

    let manager = test_manager(Vec::new());
    for route in ["/a", "/b", "/c"] {
        manager
            .register_item(&format!("{}{route}", server.uri()), None, "owner-1")
            .await
            .unwrap();
    }

    let pacer = Arc::new(RecordingPacer::default());
    let runner = SweepRunner::with_pacer(
        Arc::clone(&manager),
        Duration::from_secs(2),
        Arc::clone(&pacer) as Arc<_>,
    );
    runner.run_sweep().await;

    // No pause before the first item, one before each subsequent item.
    let pauses = pacer.pauses.lock().await;
    assert_eq!(pauses.len(), 2);
    assert!(pauses.iter().all(|d| *d == Duration::from_secs(2)));
}

#[tokio::test]
async fn test_notification_fires_once_per_drop() {
    let server = MockServer::start().await;
    // Registration sees 100; every later fetch sees 85.
    Mock::given(method("GET"))
        .and(path("/deal"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page("Deal Item", "$100.00")),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deal"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page("Deal Item", "$85.00")),
        )
        .mount(&server)
        .await;

    let notifier = Arc::new(CountingNotifier::default());
    let manager = test_manager(vec![Arc::clone(&notifier) as Arc<_>]);
    manager
        .register_item(
            &format!("{}/deal", server.uri()),
            Some(Decimal::from(90)),
            "owner-1",
        )
        .await
        .unwrap();

    let runner = SweepRunner::with_pacer(
        Arc::clone(&manager),
        Duration::from_secs(2),
        Arc::new(RecordingPacer::default()),
    );

    // First sweep: drop through target, one alert.
    let report = runner.run_sweep().await;
    assert_eq!(report.notifications_sent, 1);
    {
        let events = notifier.events.lock().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].previous_price, Decimal::from(100));
        assert_eq!(events[0].new_price, Decimal::from(85));
    }

    // Second sweep: price unchanged below target, no repeat alert.
    let report = runner.run_sweep().await;
    assert_eq!(report.notifications_sent, 0);
    assert_eq!(notifier.events.lock().await.len(), 1);
}

#[tokio::test]
async fn test_failed_notifier_does_not_block_price_update() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deal"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page("Deal Item", "$100.00")),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deal"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page("Deal Item", "$70.00")),
        )
        .mount(&server)
        .await;

    let manager = test_manager(vec![Arc::new(FailingNotifier) as Arc<_>]);
    let item = manager
        .register_item(
            &format!("{}/deal", server.uri()),
            Some(Decimal::from(80)),
            "owner-1",
        )
        .await
        .unwrap();

    let runner = SweepRunner::with_pacer(
        Arc::clone(&manager),
        Duration::from_secs(2),
        Arc::new(RecordingPacer::default()),
    );
    let report = runner.run_sweep().await;

    // The check itself succeeds; only delivery failed.
    assert_eq!(report.items_succeeded, 1);
    assert_eq!(report.notifications_sent, 0);

    let updated = manager.store().find_item(&item.id, "owner-1").await.unwrap();
    assert_eq!(updated.current_price, Decimal::from(70));
    assert_eq!(manager.store().history(&item.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_store_sweeps_cleanly() {
    let manager = test_manager(Vec::new());
    let runner = SweepRunner::with_pacer(
        manager,
        Duration::from_secs(2),
        Arc::new(RecordingPacer::default()),
    );

    let report = runner.run_sweep().await;
    assert_eq!(report.items_checked, 0);
    assert_eq!(report.items_failed, 0);
}
