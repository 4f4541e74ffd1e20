//! Process-lifetime state shared by every scrape of one [`Scraper`](crate::scrape::Scraper)
//!
//! # Components
//!
//! - `DomainRateLimiter`: sliding window of accepted requests per hostname
//! - `DomainPacer`: last-scrape timestamp per hostname, for politeness delays
//! - `CircuitBreaker`: consecutive-failure guard around the primary scrape service
//!
//! All maps are keyed by hostname, created lazily and never evicted.

mod circuit_breaker;
mod pacer;
mod rate_limiter;

// Re-export main types
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerState};
pub use pacer::DomainPacer;
pub use rate_limiter::{DomainRateLimiter, RateLimitDecision};

use crate::config::Config;

/// Mutable pipeline state owned by a single scraper instance
///
/// Two scrapers never share one of these, so tests and tenants stay isolated.
#[derive(Debug)]
pub struct ScraperState {
    pub rate_limiter: DomainRateLimiter,
    pub pacer: DomainPacer,
    pub breaker: CircuitBreaker,
}

impl ScraperState {
    pub fn new(config: &Config) -> Self {
        Self {
            rate_limiter: DomainRateLimiter::new(&config.rate_limit),
            pacer: DomainPacer::new(&config.pacing),
            breaker: CircuitBreaker::new(&config.circuit_breaker),
        }
    }

    /// Clears every map and closes the breaker
    pub fn reset(&self) {
        self.rate_limiter.reset();
        self.pacer.reset();
        self.breaker.reset();
    }
}
