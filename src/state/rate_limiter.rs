use crate::config::RateLimitConfig;
use crate::url::domain_of;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl RateLimitDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Sliding-window request limiter keyed by hostname
///
/// Each hostname keeps the timestamps of its accepted requests. Entries older
/// than the window are dropped lazily whenever that hostname is checked.
#[derive(Debug)]
pub struct DomainRateLimiter {
    window: Duration,
    max_requests: usize,
    requests: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl DomainRateLimiter {
    /// Creates a limiter from the `[rate-limit]` configuration section
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_millis(config.window_ms),
            max_requests: config.max_requests,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether a request to the URL's host is allowed and records it if so
    pub fn check_and_record(&self, url: &str) -> RateLimitDecision {
        self.check_and_record_at(url, Instant::now())
    }

    /// Same as [`check_and_record`](Self::check_and_record) with an explicit clock
    ///
    /// # Arguments
    ///
    /// * `url` - The URL about to be requested
    /// * `now` - The current time instant
    ///
    /// # Returns
    ///
    /// A decision. Unparseable URLs are denied.
    pub fn check_and_record_at(&self, url: &str, now: Instant) -> RateLimitDecision {
        let domain = match domain_of(url) {
            Some(domain) => domain,
            None => return RateLimitDecision::deny("Invalid URL for rate limit check"),
        };

        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let timestamps = requests.entry(domain.clone()).or_default();

        while let Some(oldest) = timestamps.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.max_requests {
            tracing::debug!(
                "Rate limit hit for {} ({} requests in window)",
                domain,
                timestamps.len()
            );
            return RateLimitDecision::deny(format!(
                "Rate limit exceeded for domain '{}'. Max {} requests per {}.",
                domain,
                self.max_requests,
                describe_window(self.window)
            ));
        }

        timestamps.push_back(now);
        RateLimitDecision::allow()
    }

    /// Returns how many more requests the host may make right now
    pub fn remaining_at(&self, domain: &str, now: Instant) -> usize {
        let requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let used = requests
            .get(domain)
            .map(|timestamps| {
                timestamps
                    .iter()
                    .filter(|t| now.saturating_duration_since(**t) < self.window)
                    .count()
            })
            .unwrap_or(0);
        self.max_requests.saturating_sub(used)
    }

    /// Forgets all recorded requests
    pub fn reset(&self) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

fn describe_window(window: Duration) -> String {
    match window.as_secs() {
        60 => "minute".to_string(),
        3600 => "hour".to_string(),
        _ if window.subsec_millis() == 0 => format!("{} seconds", window.as_secs()),
        _ => format!("{} ms", window.as_millis()),
    }
}
