//! Bounded fixed-delay retry
//!
//! Every gateway call runs through [`with_retry`]: on a transient
//! failure the call is retried up to the configured bound with a fixed
//! delay between attempts; after exhausting attempts the final error
//! propagates. Permanent errors short-circuit immediately.

use std::time::Duration;

use tracing::warn;

use crate::error::GatewayError;

/// Retry policy for gateway requests
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// Run `op` under the given retry policy.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.attempts && !e.is_permanent() => {
                warn!(attempt, error = %e, "Request failed, retrying");
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
