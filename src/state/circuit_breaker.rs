use crate::config::CircuitBreakerConfig;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Point-in-time view of the breaker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CircuitBreakerState {
    /// Consecutive failures since the last success or reset
    pub failure_count: u32,
    pub last_failure: Option<Instant>,
    pub is_open: bool,
}

/// Consecutive-failure circuit breaker for the primary scrape service
///
/// # State Transitions
///
/// | From | Condition | To |
/// |------|-----------|----|
/// | closed | failure count reaches `max-failures` | open |
/// | open | checked more than `reset-timeout` after the last failure | closed, count 0 |
/// | closed | success | closed, count 0 |
///
/// There is no background timer: the open to closed transition happens in
/// [`allow_request_at`](Self::allow_request_at). A success reported while the
/// breaker is open is ignored.
#[derive(Debug)]
pub struct CircuitBreaker {
    max_failures: u32,
    reset_timeout: Duration,
    state: Mutex<CircuitBreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: &CircuitBreakerConfig) -> Self {
        Self {
            max_failures: config.max_failures,
            reset_timeout: Duration::from_millis(config.reset_timeout_ms),
            state: Mutex::new(CircuitBreakerState::default()),
        }
    }

    /// Returns true if a call may be dispatched now
    pub fn allow_request(&self) -> bool {
        self.allow_request_at(Instant::now())
    }

    /// Returns true if a call may be dispatched at `now`, closing an expired open breaker
    pub fn allow_request_at(&self, now: Instant) -> bool {
        let mut state = self.lock();
        if !state.is_open {
            return true;
        }

        let expired = state
            .last_failure
            .map(|last| now.saturating_duration_since(last) > self.reset_timeout)
            .unwrap_or(true);

        if expired {
            tracing::info!("Circuit breaker reset after cooldown");
            state.is_open = false;
            state.failure_count = 0;
            true
        } else {
            false
        }
    }

    /// Records a successful call
    pub fn record_success(&self) {
        let mut state = self.lock();
        if !state.is_open {
            state.failure_count = 0;
        }
    }

    /// Records a failed call
    ///
    /// # Returns
    ///
    /// `true` if this failure opened the breaker.
    pub fn record_failure(&self) -> bool {
        self.record_failure_at(Instant::now())
    }

    pub fn record_failure_at(&self, now: Instant) -> bool {
        let mut state = self.lock();
        state.failure_count = state.failure_count.saturating_add(1);
        state.last_failure = Some(now);

        if !state.is_open && state.failure_count >= self.max_failures {
            state.is_open = true;
            tracing::warn!(
                "Circuit breaker opened after {} consecutive failures",
                state.failure_count
            );
            return true;
        }
        false
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open
    }

    pub fn snapshot(&self) -> CircuitBreakerState {
        *self.lock()
    }

    /// Closes the breaker and clears the failure count
    pub fn reset(&self) {
        *self.lock() = CircuitBreakerState::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CircuitBreakerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
