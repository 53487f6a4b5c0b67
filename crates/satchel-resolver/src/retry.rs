//! Bounded retry with capped exponential backoff.

use std::time::Duration;

use tracing::debug;

use crate::error::FetchResult;
use crate::fetch::ConfigFetcher;

/// Retry policy for configuration fetches.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Ceiling for the doubling delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Fetch `url`, retrying per `policy`. Returns the last error once the
/// attempts are exhausted.
pub async fn fetch_with_retry(
    fetcher: &dyn ConfigFetcher,
    url: &str,
    policy: &RetryPolicy,
) -> FetchResult<Vec<u8>> {
    let mut delay = policy.initial_delay;
    let mut attempt = 0u32;
    loop {
        match fetcher.fetch(url).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) => {
                if attempt >= policy.max_retries {
                    return Err(e);
                }
                attempt += 1;
                debug!(url, attempt, ?delay, error = %e, "fetch failed; retrying");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
            }
        }
    }
}
