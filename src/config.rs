use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::scheduler::validate_cron_expression;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub fetcher: FetcherConfig,
    pub sweep: SweepConfig,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Per-request timeout in seconds.
    pub request_timeout: u64,
    pub user_agent: String,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Six-field cron expression (seconds first). The default runs a sweep
    /// every four hours.
    pub cron_schedule: String,
    /// Pause between consecutive item checks within a sweep.
    pub item_delay_secs: u64,
    /// Observations kept per item; older rows are evicted.
    pub history_retention_cap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub smtp: SmtpConfig,
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Email delivery stays disabled while unset.
    pub from_address: Option<String>,
    pub from_name: String,
    pub to_address: String,
    pub use_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Discord delivery stays disabled while unset.
    pub webhook_url: Option<String>,
    pub username: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://pricewatch.db?mode=rwc".to_string(),
                max_connections: 5,
                min_connections: 1,
                acquire_timeout: 30,
            },
            fetcher: FetcherConfig {
                request_timeout: 10,
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
                retry_attempts: 2,
                retry_delay_ms: 500,
            },
            sweep: SweepConfig {
                cron_schedule: "0 0 */4 * * *".to_string(),
                item_delay_secs: 2,
                history_retention_cap: 30,
            },
            notifications: NotificationsConfig {
                smtp: SmtpConfig {
                    host: "localhost".to_string(),
                    port: 587,
                    username: None,
                    password: None,
                    from_address: None,
                    from_name: "Pricewatch".to_string(),
                    to_address: "alerts@localhost".to_string(),
                    use_tls: true,
                },
                discord: DiscordConfig {
                    webhook_url: None,
                    username: "Pricewatch".to_string(),
                },
            },
        }
    }
}

impl AppConfig {
    /// Layered load: built-in defaults, then optional config files, then
    /// `PRICEWATCH_`-prefixed environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config: AppConfig = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::Message("database url cannot be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database max_connections must be at least 1".into(),
            ));
        }
        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message(
                "fetcher request_timeout must be at least 1 second".into(),
            ));
        }
        if self.sweep.history_retention_cap == 0 {
            return Err(ConfigError::Message(
                "sweep history_retention_cap must be at least 1".into(),
            ));
        }
        validate_cron_expression(&self.sweep.cron_schedule)
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(())
    }
}
