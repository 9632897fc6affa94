use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pricewatch::config::AppConfig;
use pricewatch::extractors::ExtractorRegistry;
use pricewatch::fetcher::Fetcher;
use pricewatch::item_manager::ItemManager;
use pricewatch::notifiers::{DiscordNotifier, EmailNotifier, Notifier};
use pricewatch::scheduler::SweepScheduler;
use pricewatch::store::SqliteStore;
use pricewatch::sweep::{SweepReport, SweepRunner};
use pricewatch::utils::error::AppError;

#[derive(Parser)]
#[command(name = "pricewatch", about = "Price tracking and drop alerts", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduler and sweep on the configured cadence
    Run,
    /// Run a single sweep and exit
    Sweep,
    /// Register a product URL for tracking
    Add {
        url: String,
        /// Notify when the price reaches this value
        #[arg(long)]
        target: Option<String>,
        #[arg(long, default_value = "local")]
        owner: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pricewatch=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let store = Arc::new(
        SqliteStore::connect(&config.database, config.sweep.history_retention_cap).await?,
    );
    let fetcher = Fetcher::new(config.fetcher.clone())?;
    let registry = ExtractorRegistry::with_default_stores();

    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();
    if config.notifications.smtp.from_address.is_some() {
        notifiers.push(Arc::new(EmailNotifier::new(
            config.notifications.smtp.clone(),
        )?));
    }
    if config.notifications.discord.webhook_url.is_some() {
        notifiers.push(Arc::new(DiscordNotifier::new(
            &config.notifications.discord,
        )?));
    }
    info!(channels = notifiers.len(), "notification channels configured");

    let manager = Arc::new(ItemManager::new(fetcher, registry, store, notifiers));
    let runner = Arc::new(SweepRunner::new(
        Arc::clone(&manager),
        Duration::from_secs(config.sweep.item_delay_secs),
    ));

    match cli.command {
        Command::Run => {
            let mut scheduler = SweepScheduler::new(runner, config.sweep.clone()).await?;
            scheduler.start().await?;
            info!("pricewatch running; press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            scheduler.shutdown().await?;
        }
        Command::Sweep => {
            let report = runner.run_sweep().await;
            print_report(&report);
        }
        Command::Add { url, target, owner } => {
            let target_price = target
                .map(|raw| {
                    Decimal::from_str(&raw).map_err(|e| {
                        AppError::Validation(format!("invalid target price '{raw}': {e}"))
                    })
                })
                .transpose()?;

            let item = manager.register_item(&url, target_price, &owner).await?;
            println!(
                "Tracking \"{}\" ({}) at {} [id: {}]",
                item.title, item.store, item.current_price, item.id
            );
        }
    }

    Ok(())
}

fn print_report(report: &SweepReport) {
    println!(
        "Sweep finished in {}ms: {} checked, {} succeeded, {} failed, {} notifications",
        report.total_time_ms,
        report.items_checked,
        report.items_succeeded,
        report.items_failed,
        report.notifications_sent
    );
    for failure in &report.failures {
        println!("  failed {}: {}", failure.item_id, failure.error);
    }
}
