//! Link-Scout: URL metadata scraping with a fallback chain
//!
//! This crate turns a user-supplied URL into display metadata (title,
//! description, image, site name, author), guarding every outbound request
//! with SSRF validation, per-domain rate limiting, a circuit breaker,
//! retry with backoff and browser-like request shaping.

pub mod antibot;
pub mod config;
pub mod extract;
pub mod retry;
pub mod robots;
pub mod scrape;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Link-Scout operations
///
/// Only admission failures reach callers of [`Scraper::scrape_url`];
/// everything that goes wrong inside a stage degrades to a fallback result.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("URL rejected: {reason}")]
    Rejected { reason: String },

    #[error("Rate limited: {reason}")]
    RateLimited { reason: String },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScrapeError {
    /// True for validation and rate-limit failures
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Rejected { .. } | Self::RateLimited { .. } | Self::Url(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid host pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing host in URL")]
    MissingDomain,
}

/// Result type alias for Link-Scout operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

// Re-export commonly used types
pub use config::Config;
pub use scrape::{is_valid_url, MetadataSource, Scraper, ScraperStatus, UrlMetadata};
pub use state::ScraperState;
pub use crate::url::{classify_link, validate_url, LinkType, ValidationResult};
