//! Exponential backoff around store and network calls.
//!
//! An operation is attempted up to `max_retries` times in total. A failure is retried only
//! when its classification says so (or the caller's `retry_condition` overrides that), and
//! the wait before attempt `n + 1` is `base_delay * 2^(n - 1)`.

use crate::error::Error;
use log::*;
use service::config::Config;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Lower bound applied to configured base delays.
pub const MIN_BASE_DELAY: Duration = Duration::from_millis(500);

/// Decides whether a failure should be retried, replacing the classification's verdict.
pub type RetryCondition = Arc<dyn Fn(&Error) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct RetryOptions {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub retry_condition: Option<RetryCondition>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: service::config::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(service::config::DEFAULT_RETRY_BASE_DELAY_MS),
            retry_condition: None,
        }
    }
}

impl fmt::Debug for RetryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("retry_condition", &self.retry_condition.is_some())
            .finish()
    }
}

impl RetryOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries(),
            base_delay: config.retry_base_delay().max(MIN_BASE_DELAY),
            retry_condition: None,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_retry_condition(
        mut self,
        condition: impl Fn(&Error) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.retry_condition = Some(Arc::new(condition));
        self
    }

    /// Zero is treated as a single attempt.
    fn attempt_budget(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay slept after the `attempt`-th failure (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }

    fn should_retry(&self, err: &Error) -> bool {
        match &self.retry_condition {
            Some(condition) => condition(err),
            None => err.is_retryable(),
        }
    }
}

/// Where an operation goes after a failed attempt: back to `Attempting(attempt + 1)`
/// once `delay` has elapsed, or straight to failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Retrying { attempt: u32, delay: Duration },
    Failed(u32),
}

impl RetryState {
    pub fn after_failure(attempt: u32, err: &Error, options: &RetryOptions) -> RetryState {
        if options.should_retry(err) && attempt < options.attempt_budget() {
            RetryState::Retrying {
                attempt,
                delay: options.delay_for(attempt),
            }
        } else {
            RetryState::Failed(attempt)
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RetryExecutor {
    options: RetryOptions,
}

impl RetryExecutor {
    pub fn new(options: RetryOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(RetryOptions::from_config(config))
    }

    pub fn options(&self) -> &RetryOptions {
        &self.options
    }

    pub async fn execute<T, F, Fut>(&self, operation_name: &str, operation: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        execute(operation_name, &self.options, operation).await
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or the attempt
/// budget runs out. The last error is returned as-is so callers can inspect its classification.
pub async fn execute<T, F, Fut>(
    operation_name: &str,
    options: &RetryOptions,
    mut operation: F,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt = 1;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("{operation_name} succeeded on attempt {attempt}");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        match RetryState::after_failure(attempt, &err, options) {
            RetryState::Retrying { delay, .. } => {
                warn!(
                    "{operation_name} failed (attempt {attempt}/{}), retrying in {}ms: {err}",
                    options.attempt_budget(),
                    delay.as_millis()
                );
                sleep(delay).await;
                attempt += 1;
            }
            RetryState::Failed(_) => {
                if err.is_retryable() && attempt > 1 {
                    error!("{operation_name} failed after {attempt} attempts: {err}");
                } else {
                    debug!("{operation_name} failed without retry: {err}");
                }
                return Err(err);
            }
        }
    }
}
