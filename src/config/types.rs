use serde::Deserialize;

/// Main configuration structure for Link-Scout
///
/// Every section is optional; a missing section falls back to the defaults
/// the pipeline was tuned with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub primary: PrimaryConfig,
    pub retry: RetryProfile,
    #[serde(rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    #[serde(rename = "circuit-breaker")]
    pub circuit_breaker: CircuitBreakerConfig,
    pub pacing: PacingConfig,
    pub http: HttpConfig,
    pub security: SecurityConfig,
}

/// Primary scrape service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrimaryConfig {
    /// Whether the primary scrape stage runs at all
    pub enabled: bool,

    /// Base URL of the scrape service; requests go to `{base-url}/v1/scrape`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Optional bearer token
    #[serde(rename = "api-key")]
    pub api_key: Option<String>,

    /// Budget for a single scrape attempt (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Consult robots.txt before calling the service
    #[serde(rename = "respect-robots-txt")]
    pub respect_robots_txt: bool,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:3002".to_string(),
            api_key: None,
            timeout_ms: 5000,
            respect_robots_txt: true,
        }
    }
}

/// Retry settings applied to the primary scrape call
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryProfile {
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    #[serde(rename = "initial-delay-ms")]
    pub initial_delay_ms: u64,

    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,

    #[serde(rename = "backoff-multiplier")]
    pub backoff_multiplier: f64,

    pub jitter: bool,
}

impl Default for RetryProfile {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Per-hostname sliding window limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length (milliseconds)
    #[serde(rename = "window-ms")]
    pub window_ms: u64,

    /// Requests allowed per hostname inside one window
    #[serde(rename = "max-requests")]
    pub max_requests: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max_requests: 10,
        }
    }
}

/// Circuit breaker thresholds for the primary scrape service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the breaker
    #[serde(rename = "max-failures")]
    pub max_failures: u32,

    /// Time after the last failure before the breaker closes again (milliseconds)
    #[serde(rename = "reset-timeout-ms")]
    pub reset_timeout_ms: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            reset_timeout_ms: 10 * 60 * 1000,
        }
    }
}

/// Minimum spacing between scrapes of the same hostname
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1000,
            max_delay_ms: 3000,
        }
    }
}

/// Shared HTTP client settings (robots.txt, oEmbed, OpenGraph fetches)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    #[serde(rename = "connect-timeout-ms")]
    pub connect_timeout_ms: u64,

    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            connect_timeout_ms: 5000,
            max_redirects: 10,
        }
    }
}

/// Additional SSRF restrictions on top of the built-in blocklist
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Hostname patterns (e.g. "intranet.local" or "*.corp.example")
    #[serde(rename = "extra-blocked-hosts")]
    pub extra_blocked_hosts: Vec<String>,
}
