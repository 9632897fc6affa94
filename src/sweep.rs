use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::item_manager::ItemManager;

/// Injectable pause between consecutive item checks. Production uses the
/// tokio timer; tests substitute a recorder so sweeps finish instantly.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, delay: Duration);
}

pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Clone)]
pub struct SweepFailure {
    pub item_id: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub items_checked: usize,
    pub items_succeeded: usize,
    pub items_failed: usize,
    pub notifications_sent: usize,
    pub failures: Vec<SweepFailure>,
    pub total_time_ms: u64,
}

/// Walks every active item sequentially, pacing requests so target sites
/// see a polite trickle rather than a burst. One item's failure never
/// stops the rest of the sweep.
pub struct SweepRunner {
    manager: Arc<ItemManager>,
    pacer: Arc<dyn Pacer>,
    item_delay: Duration,
}

impl SweepRunner {
    pub fn new(manager: Arc<ItemManager>, item_delay: Duration) -> Self {
        Self::with_pacer(manager, item_delay, Arc::new(TokioPacer))
    }

    pub fn with_pacer(
        manager: Arc<ItemManager>,
        item_delay: Duration,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            manager,
            pacer,
            item_delay,
        }
    }

    pub async fn run_sweep(&self) -> SweepReport {
        let started_at = Utc::now();
        let clock = Instant::now();

        let items = match self.manager.store().active_items().await {
            Ok(items) => items,
            Err(e) => {
                error!(error = %e, "could not load active items; aborting sweep");
                return SweepReport {
                    started_at,
                    items_checked: 0,
                    items_succeeded: 0,
                    items_failed: 0,
                    notifications_sent: 0,
                    failures: Vec::new(),
                    total_time_ms: clock.elapsed().as_millis() as u64,
                };
            }
        };

        info!(items = items.len(), "sweep started");

        let mut items_succeeded = 0;
        let mut notifications_sent = 0;
        let mut failures = Vec::new();

        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                self.pacer.pause(self.item_delay).await;
            }

            match self.manager.check_item(item).await {
                Ok(result) => {
                    items_succeeded += 1;
                    if result.notified {
                        notifications_sent += 1;
                    }
                }
                Err(e) => {
                    error!(item_id = %item.id, error = %e, "item check failed");
                    failures.push(SweepFailure {
                        item_id: item.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let report = SweepReport {
            started_at,
            items_checked: items.len(),
            items_succeeded,
            items_failed: failures.len(),
            notifications_sent,
            failures,
            total_time_ms: clock.elapsed().as_millis() as u64,
        };

        info!(
            checked = report.items_checked,
            succeeded = report.items_succeeded,
            failed = report.items_failed,
            notifications = report.notifications_sent,
            elapsed_ms = report.total_time_ms,
            "sweep finished"
        );
        report
    }
}
