use super::RetryConfig;
use std::fmt;

/// Error shape understood by the retry engine
///
/// Classification looks at the HTTP status first, then a transport error
/// code (e.g. `ETIMEDOUT`), then falls back to scanning the display text.
pub trait RetryableError: fmt::Display {
    /// HTTP status code, if the error came from a response
    fn status(&self) -> Option<u16> {
        None
    }

    /// Transport error code such as `ECONNREFUSED`
    fn code(&self) -> Option<&str> {
        None
    }
}

/// Decides whether an error is worth another attempt
///
/// # Returns
///
/// * `true` - status, code or message matches `config.retryable_errors`
/// * `false` - otherwise (4xx other than 429 by default)
pub fn is_retryable<E: RetryableError + ?Sized>(error: &E, config: &RetryConfig) -> bool {
    if let Some(status) = error.status() {
        let status = status.to_string();
        return config.retryable_errors.iter().any(|e| *e == status);
    }

    if let Some(code) = error.code() {
        return config.retryable_errors.iter().any(|e| e == code);
    }

    let message = error.to_string();
    config
        .retryable_errors
        .iter()
        .any(|token| message.contains(token.as_str()))
}

impl RetryableError for reqwest::Error {
    fn status(&self) -> Option<u16> {
        reqwest::Error::status(self).map(|s| s.as_u16())
    }

    fn code(&self) -> Option<&str> {
        if self.is_timeout() {
            Some("ETIMEDOUT")
        } else if self.is_connect() {
            Some("ECONNREFUSED")
        } else {
            None
        }
    }
}

impl RetryableError for std::io::Error {
    fn code(&self) -> Option<&str> {
        match self.kind() {
            std::io::ErrorKind::ConnectionRefused => Some("ECONNREFUSED"),
            std::io::ErrorKind::TimedOut => Some("ETIMEDOUT"),
            _ => None,
        }
    }
}
