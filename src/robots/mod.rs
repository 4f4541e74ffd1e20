//! Robots.txt handling module
//!
//! Fetches `{origin}/robots.txt` before a scrape and checks the target path.
//! Any failure to fetch or read the file counts as permission to proceed.

mod parser;

pub use parser::ParsedRobots;

use crate::scrape::read_body_capped;
use reqwest::Client;
use url::Url;

/// Largest robots.txt read; anything bigger counts as unavailable
pub const MAX_ROBOTS_BYTES: usize = 512 * 1024;

/// Outcome of a robots.txt check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsVerdict {
    Allowed,
    Disallowed,
    /// robots.txt missing or unreachable; treated as allowed
    Unavailable,
}

impl RobotsVerdict {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Disallowed)
    }
}

/// Fetches robots.txt for the URL's origin
///
/// # Returns
///
/// * `Some(ParsedRobots)` - The file was fetched with a success status
/// * `None` - Any error or non-2xx response
pub async fn fetch_robots(client: &Client, url: &Url) -> Option<ParsedRobots> {
    let robots_url = url.join("/robots.txt").ok()?;

    let response = match client.get(robots_url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", robots_url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!("{} returned {}", robots_url, response.status());
        return None;
    }

    match read_body_capped(response, MAX_ROBOTS_BYTES).await {
        Ok(body) => Some(ParsedRobots::from_content(&body)),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", robots_url, e);
            None
        }
    }
}

/// Checks whether `url` may be scraped by `user_agent`
pub async fn check_robots(client: &Client, url: &str, user_agent: &str) -> RobotsVerdict {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Cannot check robots.txt for {}: {}", url, e);
            return RobotsVerdict::Unavailable;
        }
    };

    match fetch_robots(client, &parsed).await {
        Some(robots) if robots.is_allowed(parsed.path(), user_agent) => RobotsVerdict::Allowed,
        Some(_) => RobotsVerdict::Disallowed,
        None => RobotsVerdict::Unavailable,
    }
}

/// Returns false only when robots.txt was read and forbids the path
pub async fn check_robots_txt(client: &Client, url: &str, user_agent: &str) -> bool {
    check_robots(client, url, user_agent).await.is_allowed()
}
