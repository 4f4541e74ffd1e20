use super::backoff::{retry_with_backoff, RetryConfig, RetryResult};
use super::classify::RetryableError;
use reqwest::Method;
use std::future::Future;
use std::time::Duration;
use tokio::time::error::Elapsed;

/// Per-attempt budget used when no explicit timeout is given
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns true for methods that are safe to repeat
pub fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::PUT | Method::DELETE
    )
}

/// Retries an HTTP request, warning when the method is not idempotent
///
/// The warning does not stop the retry: the caller has decided the request
/// is safe to repeat, this just leaves a trace in the logs.
pub async fn retry_http_request<T, E, F, Fut>(
    method: &Method,
    operation: F,
    config: &RetryConfig,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError,
{
    if !is_idempotent(method) && config.max_retries > 0 {
        tracing::warn!(
            "Retrying non-idempotent {} request; repeated attempts may duplicate side effects",
            method
        );
    }

    retry_with_backoff(operation, config).await
}

/// Retries `operation`, bounding every attempt by `timeout`
///
/// An attempt that runs out of time is dropped and turned into `E` through
/// `From<Elapsed>`; with the default classification that error should report
/// `ETIMEDOUT` so it is retried.
pub async fn retry_with_timeout<T, E, F, Fut>(
    mut operation: F,
    config: &RetryConfig,
    timeout: Duration,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + From<Elapsed>,
{
    retry_with_backoff(
        || {
            let attempt = operation();
            async move {
                match tokio::time::timeout(timeout, attempt).await {
                    Ok(result) => result,
                    Err(elapsed) => Err(E::from(elapsed)),
                }
            }
        },
        config,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        TimedOut,
        Status(u16),
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::TimedOut => f.write_str("attempt timed out"),
                Self::Status(s) => write!(f, "HTTP {}", s),
            }
        }
    }

    impl RetryableError for TestError {
        fn status(&self) -> Option<u16> {
            match self {
                Self::Status(s) => Some(*s),
                Self::TimedOut => None,
            }
        }

        fn code(&self) -> Option<&str> {
            match self {
                Self::TimedOut => Some("ETIMEDOUT"),
                Self::Status(_) => None,
            }
        }
    }

    impl From<Elapsed> for TestError {
        fn from(_: Elapsed) -> Self {
            Self::TimedOut
        }
    }

    fn config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay: Duration::from_millis(10),
            jitter: false,
            ..RetryConfig::default()
        }
    }

    #[test]
    fn test_idempotent_methods() {
        assert!(is_idempotent(&Method::GET));
        assert!(is_idempotent(&Method::HEAD));
        assert!(is_idempotent(&Method::OPTIONS));
        assert!(is_idempotent(&Method::PUT));
        assert!(is_idempotent(&Method::DELETE));
        assert!(!is_idempotent(&Method::POST));
        assert!(!is_idempotent(&Method::PATCH));
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_is_still_retried() {
        let calls = AtomicU32::new(0);
        let result = retry_http_request(
            &Method::POST,
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TestError::Status(502))
                } else {
                    Ok(())
                }
            },
            &config(2),
        )
        .await;

        assert!(result.is_success());
        assert_eq!(result.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempts_time_out_and_retry() {
        let calls = AtomicU32::new(0);
        let result = retry_with_timeout(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
                Ok::<_, TestError>("fast")
            },
            &config(2),
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(result.result.unwrap(), "fast");
        assert_eq!(result.attempts, 2);
        assert!(result.total_duration >= Duration::from_secs(5));
        assert!(result.total_duration < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_exhausts_retries() {
        let result: RetryResult<(), TestError> = retry_with_timeout(
            || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            },
            &config(1),
            DEFAULT_ATTEMPT_TIMEOUT,
        )
        .await;

        assert_eq!(result.attempts, 2);
        assert!(matches!(result.result, Err(TestError::TimedOut)));
    }
}
