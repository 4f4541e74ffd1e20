use crate::config::types::{
    CircuitBreakerConfig, Config, HttpConfig, PacingConfig, PrimaryConfig, RateLimitConfig,
    RetryProfile, SecurityConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on configured retries; anything larger just stacks latency
const MAX_CONFIGURED_RETRIES: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_primary_config(&config.primary)?;
    validate_retry_profile(&config.retry)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_circuit_breaker_config(&config.circuit_breaker)?;
    validate_pacing_config(&config.pacing)?;
    validate_http_config(&config.http)?;
    validate_security_config(&config.security)?;
    Ok(())
}

/// Validates the primary scrape service configuration
fn validate_primary_config(config: &PrimaryConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "primary timeout-ms must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates the retry profile
fn validate_retry_profile(config: &RetryProfile) -> Result<(), ConfigError> {
    if config.max_retries > MAX_CONFIGURED_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max-retries must be at most {}, got {}",
            MAX_CONFIGURED_RETRIES, config.max_retries
        )));
    }

    if !config.backoff_multiplier.is_finite() || config.backoff_multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff-multiplier must be >= 1.0, got {}",
            config.backoff_multiplier
        )));
    }

    if config.initial_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "initial-delay-ms ({}) cannot exceed max-delay-ms ({})",
            config.initial_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates the domain rate limit window
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.window_ms == 0 {
        return Err(ConfigError::Validation(
            "rate-limit window-ms must be greater than 0".to_string(),
        ));
    }

    if config.max_requests == 0 {
        return Err(ConfigError::Validation(
            "rate-limit max-requests must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates circuit breaker thresholds
fn validate_circuit_breaker_config(config: &CircuitBreakerConfig) -> Result<(), ConfigError> {
    if config.max_failures == 0 {
        return Err(ConfigError::Validation(
            "circuit-breaker max-failures must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the domain pacing range
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "pacing min-delay-ms ({}) cannot exceed max-delay-ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates shared HTTP client settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 || config.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "http timeouts must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates the extra blocked host patterns
fn validate_security_config(config: &SecurityConfig) -> Result<(), ConfigError> {
    for pattern in &config.extra_blocked_hosts {
        validate_host_pattern(pattern)?;
    }
    Ok(())
}

/// Validates a host pattern (supports a leading "*." wildcard)
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host pattern cannot be empty".to_string(),
        ));
    }

    let host = pattern.strip_prefix("*.").unwrap_or(pattern);
    validate_host_string(host)
}

/// Validates a host string (without wildcard prefix)
///
/// Single-label names are accepted since internal hosts often have no dot.
fn validate_host_string(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host cannot be empty".to_string(),
        ));
    }

    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot start or end with '.' or '-'",
            host
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot contain consecutive dots",
            host
        )));
    }

    Ok(())
}
