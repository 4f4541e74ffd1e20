//! Retry profile that tunes itself from the recent error rate

use super::backoff::{retry_with_backoff, RetryConfig, RetryResult};
use super::classify::RetryableError;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
const HIGH_ERROR_RATE: f64 = 0.5;
const LOW_ERROR_RATE: f64 = 0.1;
const MIN_ADAPTED_DELAY: Duration = Duration::from_millis(500);

/// Counters over the current window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveRetryStats {
    pub success_count: usize,
    pub failure_count: usize,
    pub error_rate: f64,
}

/// Retry wrapper that backs off harder while a dependency is struggling
///
/// Each call to [`retry`](Self::retry) records one outcome. When more than
/// half of the outcomes in the window failed, the next call gets one retry
/// fewer (never below one) and twice the initial delay. Below ten percent it
/// gets one retry more and half the initial delay (never below 500ms).
#[derive(Debug)]
pub struct AdaptiveRetry {
    base: RetryConfig,
    window: Duration,
    outcomes: Mutex<VecDeque<(Instant, bool)>>,
}

impl AdaptiveRetry {
    pub fn new(base: RetryConfig) -> Self {
        Self::with_window(base, DEFAULT_WINDOW)
    }

    pub fn with_window(base: RetryConfig, window: Duration) -> Self {
        Self {
            base,
            window,
            outcomes: Mutex::new(VecDeque::new()),
        }
    }

    /// Runs `operation` with the currently adapted configuration
    pub async fn retry<T, E, F, Fut>(&self, operation: F) -> RetryResult<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError,
    {
        let config = self.current_config();
        let result = retry_with_backoff(operation, &config).await;
        self.record_outcome_at(result.is_success(), Instant::now());
        result
    }

    /// Configuration the next call would use
    pub fn current_config(&self) -> RetryConfig {
        self.config_at(Instant::now())
    }

    pub fn config_at(&self, now: Instant) -> RetryConfig {
        let error_rate = self.stats_at(now).error_rate;
        let mut config = self.base.clone();

        if error_rate > HIGH_ERROR_RATE {
            config.max_retries = self.base.max_retries.saturating_sub(1).max(1);
            config.initial_delay = self.base.initial_delay * 2;
        } else if error_rate < LOW_ERROR_RATE {
            config.max_retries = self.base.max_retries.saturating_add(1);
            config.initial_delay = (self.base.initial_delay / 2).max(MIN_ADAPTED_DELAY);
        }

        config
    }

    pub fn record_outcome_at(&self, success: bool, now: Instant) {
        let mut outcomes = self.lock();
        Self::prune(&mut outcomes, now, self.window);
        outcomes.push_back((now, success));
    }

    pub fn stats(&self) -> AdaptiveRetryStats {
        self.stats_at(Instant::now())
    }

    pub fn stats_at(&self, now: Instant) -> AdaptiveRetryStats {
        let mut outcomes = self.lock();
        Self::prune(&mut outcomes, now, self.window);

        let failure_count = outcomes.iter().filter(|(_, ok)| !ok).count();
        let success_count = outcomes.len() - failure_count;
        let error_rate = if outcomes.is_empty() {
            0.0
        } else {
            failure_count as f64 / outcomes.len() as f64
        };

        AdaptiveRetryStats {
            success_count,
            failure_count,
            error_rate,
        }
    }

    fn prune(outcomes: &mut VecDeque<(Instant, bool)>, now: Instant, window: Duration) {
        while let Some((at, _)) = outcomes.front() {
            if now.saturating_duration_since(*at) >= window {
                outcomes.pop_front();
            } else {
                break;
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<(Instant, bool)>> {
        self.outcomes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Unavailable;

    impl fmt::Display for Unavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("HTTP 503")
        }
    }

    impl RetryableError for Unavailable {
        fn status(&self) -> Option<u16> {
            Some(503)
        }
    }

    fn base() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            ..RetryConfig::default()
        }
    }

    #[test]
    fn test_low_error_rate_is_more_aggressive() {
        let adaptive = AdaptiveRetry::new(base());
        let now = Instant::now();
        for _ in 0..10 {
            adaptive.record_outcome_at(true, now);
        }

        let config = adaptive.config_at(now);
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.initial_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_high_error_rate_backs_off() {
        let adaptive = AdaptiveRetry::new(base());
        let now = Instant::now();
        for _ in 0..3 {
            adaptive.record_outcome_at(false, now);
        }
        adaptive.record_outcome_at(true, now);

        let config = adaptive.config_at(now);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.initial_delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_moderate_error_rate_keeps_base() {
        let adaptive = AdaptiveRetry::new(base());
        let now = Instant::now();
        for i in 0..10 {
            adaptive.record_outcome_at(i >= 3, now);
        }
        assert_eq!(adaptive.config_at(now), base());
    }

    #[test]
    fn test_retry_floor_and_delay_floor() {
        let adaptive = AdaptiveRetry::new(RetryConfig {
            max_retries: 1,
            initial_delay: Duration::from_millis(600),
            ..RetryConfig::default()
        });
        let now = Instant::now();
        adaptive.record_outcome_at(false, now);
        assert_eq!(adaptive.config_at(now).max_retries, 1);

        let fresh = AdaptiveRetry::new(RetryConfig {
            initial_delay: Duration::from_millis(600),
            ..RetryConfig::default()
        });
        assert_eq!(
            fresh.config_at(now).initial_delay,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_old_outcomes_leave_the_window() {
        let adaptive = AdaptiveRetry::new(base());
        let start = Instant::now();
        for _ in 0..5 {
            adaptive.record_outcome_at(false, start);
        }
        assert_eq!(adaptive.stats_at(start).failure_count, 5);

        let later = start + Duration::from_secs(61);
        let stats = adaptive.stats_at(later);
        assert_eq!(stats.failure_count, 0);
        assert_eq!(stats.error_rate, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_records_outcome() {
        let adaptive = AdaptiveRetry::new(RetryConfig {
            max_retries: 0,
            ..RetryConfig::default()
        });

        let result: RetryResult<(), _> = adaptive.retry(|| async { Err(Unavailable) }).await;
        assert!(!result.is_success());

        let stats = adaptive.stats();
        assert_eq!(stats.failure_count, 1);
        assert_eq!(stats.success_count, 0);
        assert!(stats.error_rate > 0.5);
    }
}
