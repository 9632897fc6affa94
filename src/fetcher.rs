use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::debug;

use crate::config::FetcherConfig;
use crate::utils::error::AppError;

/// How a document retrieval failed. Kept separate from extraction failures
/// so the sweep can report the two classes distinctly.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },
}

/// Outbound document retrieval with a fixed timeout and a browser-shaped
/// User-Agent. Target sites routinely reject clients that announce
/// themselves as bots, so the header policy lives here.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    /// Retrieves the document at `url`, retrying transient failures on a
    /// fixed interval up to the configured attempt count.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let strategy = FixedInterval::from_millis(self.config.retry_delay_ms)
            .take(self.config.retry_attempts as usize);
        Retry::spawn(strategy, || self.fetch_once(url)).await
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching document");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| classify_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|err| classify_error(url, err))
    }
}

fn classify_error(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
