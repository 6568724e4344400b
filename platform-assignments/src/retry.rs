//! Backoff for store calls.
//!
//! Store backends fail transiently (dropped connections, timeouts). The
//! helper here retries [`StoreError::is_transient`] failures with
//! exponential backoff and returns every other error on the first attempt.
//!
//! # Example
//!
//! ```rust,no_run
//! use platform_assignments::retry::{with_store_retry, RetryConfig};
//! use platform_assignments::StoreResult;
//!
//! async fn example() -> StoreResult<usize> {
//!     with_store_retry(&RetryConfig::default(), || async {
//!         // Your store call here
//!         Ok(3)
//!     }).await
//! }
//! ```

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Backoff settings for store calls.
///
/// The default suits a networked store: three attempts starting at 100ms,
/// doubling, capped at 10s. `max_attempts = 1` disables retrying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Growth factor applied per retry
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            exponential_base: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.exponential_base.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        if capped.is_finite() && capped >= 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.max_delay
        }
    }
}

/// Run a store call, retrying transient failures.
///
/// Permanent errors ([`StoreError::NotFound`], [`StoreError::Duplicate`],
/// [`StoreError::Internal`]) are returned after the first attempt. A
/// transient error is returned once `max_attempts` calls have failed.
pub async fn with_store_retry<F, Fut, T>(config: &RetryConfig, mut call: F) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut attempt = 1;

    loop {
        let error: StoreError = match call().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Store call recovered");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !error.is_transient() {
            tracing::debug!(error = %error, code = error.error_code(), "Store call failed permanently");
            return Err(error);
        }
        if attempt >= config.max_attempts {
            tracing::error!(attempts = attempt, error = %error, "Store call still failing, giving up");
            return Err(error);
        }

        let delay = config.delay_for(attempt);
        tracing::warn!(
            attempt,
            max_attempts = config.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Transient store failure, backing off"
        );
        sleep(delay).await;
        attempt += 1;
    }
}
