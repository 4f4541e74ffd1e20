use crate::config::PacingConfig;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Spaces out consecutive scrapes of the same hostname
///
/// This is a politeness hint, not a hard limit. The last-scrape timestamp is
/// read and written under separate lock acquisitions and the lock is never
/// held across the sleep, so two concurrent callers for the same host may
/// both see the old timestamp and skip waiting.
#[derive(Debug)]
pub struct DomainPacer {
    min_delay: Duration,
    max_delay: Duration,
    last_scrape: Mutex<HashMap<String, Instant>>,
}

impl DomainPacer {
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            last_scrape: Mutex::new(HashMap::new()),
        }
    }

    /// Computes how long a scrape of `host` should wait at time `now`
    ///
    /// # Returns
    ///
    /// * `None` - The host was not scraped within the minimum delay
    /// * `Some(Duration)` - A random delay in `[min, max]`, never shorter
    ///   than what remains of the minimum delay
    pub fn delay_for_at(&self, host: &str, now: Instant) -> Option<Duration> {
        let last = {
            let last_scrape = self.last_scrape.lock().unwrap_or_else(|e| e.into_inner());
            last_scrape.get(host).copied()
        }?;

        let elapsed = now.saturating_duration_since(last);
        if elapsed >= self.min_delay {
            return None;
        }

        let remaining = self.min_delay - elapsed;
        Some(self.random_delay().max(remaining))
    }

    /// Waits for the host's turn, then records the scrape
    ///
    /// # Returns
    ///
    /// How long the call slept.
    pub async fn wait_turn(&self, host: &str) -> Duration {
        let delay = self.delay_for_at(host, Instant::now());

        if let Some(delay) = delay {
            tracing::debug!("Pacing {} for {}ms", host, delay.as_millis());
            tokio::time::sleep(delay).await;
        }

        self.record_at(host, Instant::now());
        delay.unwrap_or_default()
    }

    /// Records a scrape of `host` at `now`
    pub fn record_at(&self, host: &str, now: Instant) {
        self.last_scrape
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(host.to_string(), now);
    }

    /// Forgets all recorded scrapes
    pub fn reset(&self) {
        self.last_scrape
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn random_delay(&self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if max <= min {
            return self.min_delay;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}
