use super::classify::{is_retryable, RetryableError};
use crate::config::RetryProfile;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Tokens treated as transient by default: statuses, then transport codes
pub const DEFAULT_RETRYABLE_ERRORS: &[&str] = &[
    "429",
    "500",
    "502",
    "503",
    "504",
    "ECONNREFUSED",
    "ETIMEDOUT",
    "ENOTFOUND",
];

/// Retry engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts are `max_retries + 1`
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Scale each delay by a random factor in `[0.5, 1.5)`
    pub jitter: bool,
    pub retryable_errors: Vec<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            backoff_multiplier: 2.0,
            jitter: true,
            retryable_errors: DEFAULT_RETRYABLE_ERRORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl From<&RetryProfile> for RetryConfig {
    fn from(profile: &RetryProfile) -> Self {
        Self {
            max_retries: profile.max_retries,
            initial_delay: Duration::from_millis(profile.initial_delay_ms),
            max_delay: Duration::from_millis(profile.max_delay_ms),
            backoff_multiplier: profile.backoff_multiplier,
            jitter: profile.jitter,
            ..Self::default()
        }
    }
}

/// Outcome of a retried operation
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The last attempt's result
    pub result: Result<T, E>,
    /// `1 + retries performed`, always at least 1
    pub attempts: u32,
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Calculates the delay before retry number `attempt_index + 1`
///
/// Delay is `initial * multiplier^attempt_index`, capped at `max_delay`,
/// then scaled by a random factor in `[0.5, 1.5)` when jitter is on.
///
/// # Arguments
///
/// * `attempt_index` - Zero for the delay after the first failed attempt
/// * `config` - The retry configuration
pub fn calculate_backoff(attempt_index: u32, config: &RetryConfig) -> Duration {
    let initial_ms = config.initial_delay.as_millis() as f64;
    let max_ms = config.max_delay.as_millis() as f64;

    let exponent = i32::try_from(attempt_index).unwrap_or(i32::MAX);
    let raw = initial_ms * config.backoff_multiplier.powi(exponent);
    let capped = if raw.is_finite() { raw.min(max_ms) } else { max_ms };

    let delay = if config.jitter {
        capped * rand::thread_rng().gen_range(0.5..1.5)
    } else {
        capped
    };

    Duration::from_millis(delay.max(0.0).round() as u64)
}

/// Runs `operation` until it succeeds, fails permanently, or retries run out
///
/// Non-retryable errors (see [`is_retryable`]) stop immediately after one
/// attempt. Between attempts the task sleeps for [`calculate_backoff`].
///
/// # Example
///
/// ```no_run
/// use link_scout::retry::{retry_with_backoff, RetryConfig};
///
/// # async fn example(client: reqwest::Client) {
/// let result = retry_with_backoff(
///     || client.get("https://example.com").send(),
///     &RetryConfig::default(),
/// )
/// .await;
/// println!("took {} attempts", result.attempts);
/// # }
/// ```
pub async fn retry_with_backoff<T, E, F, Fut>(mut operation: F, config: &RetryConfig) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError,
{
    let start = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => {
                return RetryResult {
                    result: Ok(value),
                    attempts: attempt + 1,
                    total_duration: start.elapsed(),
                };
            }
            Err(error) => {
                if !is_retryable(&error, config) {
                    tracing::debug!("Attempt {} failed permanently: {}", attempt + 1, error);
                    return RetryResult {
                        result: Err(error),
                        attempts: attempt + 1,
                        total_duration: start.elapsed(),
                    };
                }

                if attempt >= config.max_retries {
                    tracing::warn!("Giving up after {} attempts: {}", attempt + 1, error);
                    return RetryResult {
                        result: Err(error),
                        attempts: attempt + 1,
                        total_duration: start.elapsed(),
                    };
                }

                let delay = calculate_backoff(attempt, config);
                tracing::debug!(
                    "Attempt {} failed ({}), retrying in {}ms",
                    attempt + 1,
                    error,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
