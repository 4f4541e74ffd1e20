//! Retry engine: exponential backoff with jitter
//!
//! Only transient failures (429, 5xx gateway errors, refused connections,
//! timeouts, DNS misses) are retried; everything else fails after a single
//! attempt.
//!
//! # Components
//!
//! - `RetryableError`: how an error exposes its status and transport code
//! - `retry_with_backoff`: the core loop
//! - `retry_http_request` / `retry_with_timeout`: HTTP-aware and per-attempt-timeout variants
//! - `AdaptiveRetry`: tunes the profile from the recent error rate

mod adaptive;
mod backoff;
mod classify;
mod variants;

pub use adaptive::{AdaptiveRetry, AdaptiveRetryStats};
pub use backoff::{
    calculate_backoff, retry_with_backoff, RetryConfig, RetryResult, DEFAULT_RETRYABLE_ERRORS,
};
pub use classify::{is_retryable, RetryableError};
pub use variants::{is_idempotent, retry_http_request, retry_with_timeout, DEFAULT_ATTEMPT_TIMEOUT};
