//! Pipeline counters
//!
//! Counters are plain atomics bumped by the orchestrator and the primary
//! stage. A [`StatsSnapshot`] is a point-in-time copy suitable for logging or
//! JSON output.

use super::metadata::MetadataSource;
use crate::robots::RobotsVerdict;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by one scraper
#[derive(Debug, Default)]
pub struct ScrapeStats {
    primary_scrape: AtomicU64,
    oembed: AtomicU64,
    opengraph: AtomicU64,
    fallback: AtomicU64,
    rejected: AtomicU64,
    rate_limited: AtomicU64,
    generic_titles: AtomicU64,
    robots_allowed: AtomicU64,
    robots_disallowed: AtomicU64,
    robots_unavailable: AtomicU64,
    retry_attempts: AtomicU64,
    breaker_openings: AtomicU64,
}

/// Copy of [`ScrapeStats`] at one moment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Results produced by the primary scrape service
    pub primary_scrape: u64,

    /// Results produced by an oEmbed provider
    pub oembed: u64,

    /// Results produced from OpenGraph tags
    pub opengraph: u64,

    /// Results derived from the URL alone
    pub fallback: u64,

    /// URLs refused by the SSRF validator
    pub rejected: u64,

    /// URLs refused by the domain rate limiter
    pub rate_limited: u64,

    /// Results whose title was replaced for display
    pub generic_titles: u64,

    pub robots_allowed: u64,
    pub robots_disallowed: u64,
    pub robots_unavailable: u64,

    /// Primary scrape attempts beyond the first
    pub retry_attempts: u64,

    /// Times the circuit breaker opened
    pub breaker_openings: u64,
}

impl StatsSnapshot {
    /// Total results returned to callers
    pub fn total_scraped(&self) -> u64 {
        self.primary_scrape + self.oembed + self.opengraph + self.fallback
    }
}

impl ScrapeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_source(&self, source: MetadataSource) {
        let counter = match source {
            MetadataSource::PrimaryScrape => &self.primary_scrape,
            MetadataSource::Oembed => &self.oembed,
            MetadataSource::Opengraph => &self.opengraph,
            MetadataSource::Fallback => &self.fallback,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generic_title(&self) {
        self.generic_titles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_robots(&self, verdict: RobotsVerdict) {
        let counter = match verdict {
            RobotsVerdict::Allowed => &self.robots_allowed,
            RobotsVerdict::Disallowed => &self.robots_disallowed,
            RobotsVerdict::Unavailable => &self.robots_unavailable,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the retries behind one primary call (`attempts - 1`)
    pub fn record_attempts(&self, attempts: u32) {
        let retries = u64::from(attempts.saturating_sub(1));
        self.retry_attempts.fetch_add(retries, Ordering::Relaxed);
    }

    pub fn record_breaker_opened(&self) {
        self.breaker_openings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        StatsSnapshot {
            primary_scrape: load(&self.primary_scrape),
            oembed: load(&self.oembed),
            opengraph: load(&self.opengraph),
            fallback: load(&self.fallback),
            rejected: load(&self.rejected),
            rate_limited: load(&self.rate_limited),
            generic_titles: load(&self.generic_titles),
            robots_allowed: load(&self.robots_allowed),
            robots_disallowed: load(&self.robots_disallowed),
            robots_unavailable: load(&self.robots_unavailable),
            retry_attempts: load(&self.retry_attempts),
            breaker_openings: load(&self.breaker_openings),
        }
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// # Arguments
///
/// * `stats` - The snapshot to display
pub fn print_statistics(stats: &StatsSnapshot) {
    eprintln!("=== Scrape Statistics ===\n");

    let total = stats.total_scraped();
    eprintln!("Results by Source:");
    for (source, count) in [
        (MetadataSource::PrimaryScrape, stats.primary_scrape),
        (MetadataSource::Oembed, stats.oembed),
        (MetadataSource::Opengraph, stats.opengraph),
        (MetadataSource::Fallback, stats.fallback),
    ] {
        let percentage = if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        eprintln!("  {}: {} ({:.1}%)", source, count, percentage);
    }
    eprintln!();

    eprintln!("Rejections:");
    eprintln!("  Validation: {}", stats.rejected);
    eprintln!("  Rate limited: {}", stats.rate_limited);
    eprintln!();

    eprintln!("robots.txt:");
    eprintln!(
        "  allowed {} / disallowed {} / unavailable {}",
        stats.robots_allowed, stats.robots_disallowed, stats.robots_unavailable
    );
    eprintln!();

    eprintln!("Generic titles replaced: {}", stats.generic_titles);
    eprintln!("Primary retries: {}", stats.retry_attempts);
    eprintln!("Circuit breaker openings: {}", stats.breaker_openings);
}
