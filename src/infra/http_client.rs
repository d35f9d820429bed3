use crate::config::HttpConfig;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Fetches listing pages as decoded text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and decode the body with the response charset, or with
    /// `default_charset` when the response does not declare one.
    async fn fetch_html(&self, url: &str, default_charset: &str) -> Result<String>;
}

pub struct ReqwestHttp {
    client: reqwest::Client,
    max_retries: u32,
    backoff: Duration,
}

impl ReqwestHttp {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        })
    }
}

#[async_trait]
impl PageFetcher for ReqwestHttp {
    async fn fetch_html(&self, url: &str, default_charset: &str) -> Result<String> {
        retry_with_backoff(url, self.max_retries, self.backoff, || async move {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ScraperError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            let body = response.text_with_charset(default_charset).await?;
            debug!("Fetched {} bytes from {}", body.len(), url);
            Ok(body)
        })
        .await
    }
}

/// Whether another attempt could plausibly succeed
pub fn is_retryable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        ScraperError::Status { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

/// Run `operation`, retrying transient failures with exponential backoff.
///
/// Non-retryable errors are returned immediately; after `max_retries`
/// further attempts the last error is returned.
pub async fn retry_with_backoff<F, Fut, T>(
    operation_name: &str,
    max_retries: u32,
    initial_backoff: Duration,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    let mut backoff = initial_backoff;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt < max_retries && is_retryable(&err) => {
                attempt += 1;
                warn!(
                    operation = operation_name,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
            Err(err) => return Err(err),
        }
    }
}
