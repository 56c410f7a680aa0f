use std::future::Future;
use std::time::Duration;

use crate::FriendFiError;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            delay: Duration::from_millis(200),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Polls long enough to outlast the standard read-cache TTL. Writes
    /// only invalidate the signing wallet's cached reads, so assertions
    /// on a counterparty's counters have to wait out the cache instead.
    pub fn outlast_cache() -> Self {
        Self {
            max_retries: 35,
            delay: Duration::from_secs(1),
        }
    }
}

/// Retry an async operation until it succeeds or max retries is reached.
///
/// Contract reads by one wallet can serve another wallet's pre-write state
/// from cache for up to a TTL; this rides out that window.
pub async fn retry_until<F, Fut, T>(
    config: RetryConfig,
    operation: F,
    description: &str,
) -> Result<T, FriendFiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FriendFiError>>,
{
    let mut retry_count = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if retry_count > 0 {
                    tracing::info!("✓ {} succeeded after {} retries", description, retry_count);
                }
                return Ok(result);
            }
            Err(e) => {
                retry_count += 1;

                if retry_count >= config.max_retries {
                    tracing::error!(
                        "✗ {} failed after {} retries: {}",
                        description,
                        retry_count,
                        e
                    );
                    return Err(FriendFiError::Other(anyhow::anyhow!(
                        "Operation '{}' failed after {} retries: {}",
                        description,
                        retry_count,
                        e
                    )));
                }

                tracing::debug!(
                    "{} not ready yet (attempt {}/{}), retrying in {:?}",
                    description,
                    retry_count,
                    config.max_retries,
                    config.delay
                );
                tokio::time::sleep(config.delay).await;
            }
        }
    }
}
