use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricewatch::config::SweepConfig;
use pricewatch::scheduler::SweepScheduler;
use pricewatch::sweep::SweepRunner;

use super::{product_page, test_manager, RecordingPacer, SlowPacer};

fn test_sweep_config() -> SweepConfig {
    SweepConfig {
        cron_schedule: "0 0 */4 * * *".to_string(),
        item_delay_secs: 2,
        history_retention_cap: 30,
    }
}

async fn mount_pages(server: &MockServer, count: usize) {
    for index in 0..count {
        Mock::given(method("GET"))
            .and(path(format!("/item/{index}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(product_page(&format!("Item {index}"), "$15.00")),
            )
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_run_now_produces_a_report() {
    let server = MockServer::start().await;
    mount_pages(&server, 2).await;

    let manager = test_manager(Vec::new());
    for index in 0..2 {
        manager
            .register_item(&format!("{}/item/{index}", server.uri()), None, "owner-1")
            .await
            .unwrap();
    }

    let runner = Arc::new(SweepRunner::with_pacer(
        manager,
        Duration::from_secs(2),
        Arc::new(RecordingPacer::default()),
    ));
    let scheduler = SweepScheduler::new(runner, test_sweep_config()).await.unwrap();

    assert!(scheduler.last_report().await.is_none());
    scheduler.run_now();

    let mut report = None;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        report = scheduler.last_report().await;
        if report.is_some() {
            break;
        }
    }
    let report = report.expect("sweep should complete");
    assert_eq!(report.items_checked, 2);
    assert_eq!(report.items_succeeded, 2);
}

#[tokio::test]
async fn test_overlapping_triggers_are_skipped() {
    let server = MockServer::start().await;
    mount_pages(&server, 3).await;

    let manager = test_manager(Vec::new());
    for index in 0..3 {
        manager
            .register_item(&format!("{}/item/{index}", server.uri()), None, "owner-1")
            .await
            .unwrap();
    }

    // Each sweep pauses twice at ~200ms, so the first sweep is still
    // running when the second trigger lands.
    let pacer = Arc::new(SlowPacer::default());
    let runner = Arc::new(SweepRunner::with_pacer(
        manager,
        Duration::from_secs(2),
        Arc::clone(&pacer) as Arc<_>,
    ));
    let scheduler = SweepScheduler::new(runner, test_sweep_config()).await.unwrap();

    scheduler.run_now();
    tokio::time::sleep(Duration::from_millis(50)).await;
    scheduler.run_now();

    tokio::time::sleep(Duration::from_secs(1)).await;

    // One sweep ran (2 pauses); the overlapping trigger was dropped.
    assert_eq!(pacer.pauses.lock().await.len(), 2);
    let report = scheduler.last_report().await.expect("first sweep completes");
    assert_eq!(report.items_checked, 3);
}

#[tokio::test]
async fn test_scheduler_start_and_shutdown() {
    let manager = test_manager(Vec::new());
    let runner = Arc::new(SweepRunner::with_pacer(
        manager,
        Duration::from_secs(2),
        Arc::new(RecordingPacer::default()),
    ));

    let mut scheduler = SweepScheduler::new(runner, test_sweep_config()).await.unwrap();
    scheduler.start().await.unwrap();
    scheduler.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_start_rejects_invalid_cron() {
    let manager = test_manager(Vec::new());
    let runner = Arc::new(SweepRunner::with_pacer(
        manager,
        Duration::from_secs(2),
        Arc::new(RecordingPacer::default()),
    ));

    let mut config = test_sweep_config();
    config.cron_schedule = "every four hours".to_string();
    let scheduler = SweepScheduler::new(runner, config).await.unwrap();

    assert!(scheduler.start().await.is_err());
}
