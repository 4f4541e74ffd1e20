//! HTTP fetcher shared by every scrape stage
//!
//! This module handles:
//! - Building the shared HTTP client with timeouts and a redirect policy
//! - GET requests for page HTML
//! - Error classification for the retry engine

use crate::config::HttpConfig;
use crate::retry::RetryableError;
use crate::url::validate_url;
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, Client, Response};
use std::error::Error as _;
use std::time::Duration;
use thiserror::Error;
use tokio::time::error::Elapsed;
use url::Url;

/// Largest page body read from a site (10 MB)
pub const MAX_PAGE_BYTES: usize = 10 * 1024 * 1024;

/// Failure of a single outbound request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("DNS lookup failed: {0}")]
    Dns(String),

    #[error("scrape service reported failure: {0}")]
    ServiceRejected(String),

    #[error("invalid response body: {0}")]
    InvalidBody(String),

    #[error("response body larger than {limit} bytes")]
    TooLarge { limit: usize },

    #[error("HTTP client error: {0}")]
    Other(reqwest::Error),
}

impl FetchError {
    /// Maps a reqwest error onto the transport categories the retry engine knows
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout;
        }

        if let Some(status) = error.status() {
            return Self::Status {
                status: status.as_u16(),
                url: error.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }

        if error.is_connect() {
            let detail = source_chain(&error);
            if detail.contains("dns error") || detail.contains("failed to lookup address") {
                return Self::Dns(detail);
            }
            return Self::Connect(detail);
        }

        if error.is_decode() || error.is_body() {
            return Self::InvalidBody(error.to_string());
        }

        Self::Other(error)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        Self::from_reqwest(error)
    }
}

impl From<Elapsed> for FetchError {
    fn from(_: Elapsed) -> Self {
        Self::Timeout
    }
}

impl RetryableError for FetchError {
    fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn code(&self) -> Option<&str> {
        match self {
            Self::Timeout => Some("ETIMEDOUT"),
            Self::Connect(_) => Some("ECONNREFUSED"),
            Self::Dns(_) => Some("ENOTFOUND"),
            // Parser messages carry column numbers that could look like statuses
            Self::InvalidBody(_) => Some("EBADMSG"),
            Self::TooLarge { .. } => Some("EFBIG"),
            _ => None,
        }
    }
}

fn source_chain(error: &reqwest::Error) -> String {
    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        detail.push_str(": ");
        detail.push_str(&inner.to_string());
        source = inner.source();
    }
    detail
}

/// Builds the shared HTTP client
///
/// Redirects are followed up to `max-redirects` hops, and only while every
/// hop still passes SSRF validation, so a public page cannot bounce the
/// scraper onto an internal address.
///
/// # Arguments
///
/// * `config` - The `[http]` configuration section
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let max_redirects = config.max_redirects;
    let policy = Policy::custom(move |attempt| {
        if attempt.previous().len() >= max_redirects {
            return attempt.error(format!("more than {} redirects", max_redirects));
        }
        let verdict = validate_url(attempt.url().as_str());
        if verdict.is_valid {
            attempt.follow()
        } else {
            let reason = verdict.reason.unwrap_or_default();
            attempt.error(format!("redirect blocked: {}", reason))
        }
    });

    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .redirect(policy)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body with the given request headers
///
/// Non-2xx responses become [`FetchError::Status`].
pub async fn fetch_html(client: &Client, url: &Url, headers: HeaderMap) -> Result<String, FetchError> {
    let response = client.get(url.clone()).headers(headers).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }

    read_body_capped(response, MAX_PAGE_BYTES).await
}

/// Reads a response body, refusing anything over `limit` bytes
///
/// A declared `Content-Length` over the limit fails before any byte is read;
/// otherwise the body is read chunk by chunk and abandoned once it grows past
/// the limit. Invalid UTF-8 is replaced rather than rejected.
pub async fn read_body_capped(mut response: Response, limit: usize) -> Result<String, FetchError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            tracing::debug!("{} declares {} bytes, limit is {}", response.url(), len, limit);
            return Err(FetchError::TooLarge { limit });
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            tracing::debug!("{} body exceeded {} bytes", response.url(), limit);
            return Err(FetchError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}
