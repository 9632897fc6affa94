use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

use crate::config::SweepConfig;
use crate::sweep::{SweepReport, SweepRunner};
use crate::utils::error::AppError;

/// Drives sweeps on a cron cadence. A mutex around the runner guarantees at
/// most one sweep in flight; a trigger that fires while a sweep is still
/// running is skipped, not queued.
pub struct SweepScheduler {
    scheduler: JobScheduler,
    runner: Arc<SweepRunner>,
    in_flight: Arc<Mutex<()>>,
    last_report: Arc<RwLock<Option<SweepReport>>>,
    config: SweepConfig,
}

impl SweepScheduler {
    pub async fn new(runner: Arc<SweepRunner>, config: SweepConfig) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::Scheduler(e.to_string()))?;

        Ok(Self {
            scheduler,
            runner,
            in_flight: Arc::new(Mutex::new(())),
            last_report: Arc::new(RwLock::new(None)),
            config,
        })
    }

    pub async fn start(&self) -> Result<(), AppError> {
        let cron = self.config.cron_schedule.clone();
        validate_cron_expression(&cron)?;

        let runner = Arc::clone(&self.runner);
        let in_flight = Arc::clone(&self.in_flight);
        let last_report = Arc::clone(&self.last_report);

        let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
            let runner = Arc::clone(&runner);
            let in_flight = Arc::clone(&in_flight);
            let last_report = Arc::clone(&last_report);
            Box::pin(async move {
                guarded_sweep(runner, in_flight, last_report).await;
            })
        })
        .map_err(|e| AppError::Scheduler(e.to_string()))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::Scheduler(e.to_string()))?;
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::Scheduler(e.to_string()))?;

        info!(cron = %cron, "sweep scheduler started");
        Ok(())
    }

    /// Fires a sweep immediately without waiting for the cron trigger. The
    /// overlap guard still applies.
    pub fn run_now(&self) {
        let runner = Arc::clone(&self.runner);
        let in_flight = Arc::clone(&self.in_flight);
        let last_report = Arc::clone(&self.last_report);
        tokio::spawn(async move {
            guarded_sweep(runner, in_flight, last_report).await;
        });
    }

    pub async fn last_report(&self) -> Option<SweepReport> {
        self.last_report.read().await.clone()
    }

    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::Scheduler(e.to_string()))?;
        info!("sweep scheduler stopped");
        Ok(())
    }
}

async fn guarded_sweep(
    runner: Arc<SweepRunner>,
    in_flight: Arc<Mutex<()>>,
    last_report: Arc<RwLock<Option<SweepReport>>>,
) {
    let Ok(_guard) = in_flight.try_lock() else {
        warn!("sweep already in progress; skipping trigger");
        return;
    };
    let report = runner.run_sweep().await;
    *last_report.write().await = Some(report);
}

/// Light sanity check on a cron expression before handing it to the
/// scheduler. Accepts 5-field (minute-led) or 6-field (second-led) forms.
pub fn validate_cron_expression(expression: &str) -> Result<(), AppError> {
    let parts: Vec<&str> = expression.split_whitespace().collect();
    if parts.len() != 5 && parts.len() != 6 {
        return Err(AppError::Scheduler(format!(
            "invalid cron expression '{expression}': expected 5 or 6 fields, found {}",
            parts.len()
        )));
    }
    for part in &parts {
        if !part
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '*' | '-' | ',' | '/'))
        {
            return Err(AppError::Scheduler(format!(
                "invalid cron expression '{expression}': bad field '{part}'"
            )));
        }
    }
    Ok(())
}
