//! Retry policy for transient failures
//!
//! Navigation failures, empty listings and structural extraction failures are
//! all treated as transient. Without a configured bound they are retried
//! forever, immediately.

use crate::config::RetryConfig;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts per unit of work, or `None` for no limit
    pub max_attempts: Option<u32>,

    /// Base pause, multiplied by the number of failures so far
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Retries forever, without pausing
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: (config.max_attempts > 0).then_some(config.max_attempts),
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }

    /// Returns true if another attempt is allowed after `failures` failures
    pub fn should_retry(&self, failures: u32) -> bool {
        match self.max_attempts {
            Some(max) => failures < max,
            None => true,
        }
    }

    /// Pause before the next attempt
    pub fn delay(&self, failures: u32) -> Duration {
        self.backoff.saturating_mul(failures)
    }

    pub async fn pause(&self, failures: u32) {
        let delay = self.delay(failures);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
