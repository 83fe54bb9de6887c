//! 重试策略
//!
//! 可重试错误按 `base_delay × 2^(attempt-1)` 退避，最后一次失败后不再等待。

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use super::{CancelSignal, RequestError};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// 重试策略：最多 `max_attempts` 次，第 k 次失败后等待 `base_delay · 2^(k-1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Backoff after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Total backoff spent when every attempt fails.
    pub fn exhausted_delay(&self) -> Duration {
        (1..self.max_attempts.max(1))
            .map(|attempt| self.delay_for(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

pub(crate) async fn run_with_retry<T, F, Fut>(
    request_id: &str,
    policy: RetryPolicy,
    mut op: F,
    mut cancel: CancelSignal,
) -> Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(request_id, attempt, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !err.is_retryable() {
            debug!(request_id, error = %err, "request failed, not retryable");
            return Err(err);
        }
        if attempt >= max_attempts {
            warn!(request_id, attempts = attempt, error = %err, "request failed, retries exhausted");
            return Err(err);
        }

        let backoff = policy.delay_for(attempt);
        warn!(request_id, attempt, ?backoff, error = %err, "request failed, retrying");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(request_id, attempt, "retry sequence cancelled during backoff");
                return Err(RequestError::Cancelled(request_id.to_string()));
            }
            _ = sleep(backoff) => {}
        }
        attempt += 1;
    }
}
