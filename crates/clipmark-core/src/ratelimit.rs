//! Per-domain rate limiting for polite dispatch.
//!
//! The limiter is an explicit state object owned by the scheduler — not a
//! global — and answers two questions for a domain: "dispatchable now?" and
//! "how long until dispatchable?". It is built on [`tokio::time::Instant`]
//! so scheduler tests run against tokio's paused clock.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::AppError;

/// Tracks the last dispatch instant per domain against a single shared
/// minimum interval. `min_interval = 0` disables limiting entirely.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_dispatch: HashMap<String, Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: HashMap::new(),
        }
    }

    /// Build a limiter from a configured interval in seconds.
    ///
    /// Negative or non-finite values are fatal configuration errors.
    pub fn from_secs(secs: f64) -> Result<Self, AppError> {
        if secs < 0.0 || !secs.is_finite() {
            return Err(AppError::InvalidInterval(secs));
        }
        Ok(Self::new(Duration::from_secs_f64(secs)))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// True iff a request to `domain` may be dispatched at `now`.
    pub fn can_dispatch(&self, domain: &str, now: Instant) -> bool {
        match self.last_dispatch.get(domain) {
            None => true,
            Some(last) => now.duration_since(*last) >= self.min_interval,
        }
    }

    /// How long until `domain` becomes dispatchable; zero if it already is.
    pub fn time_until_ready(&self, domain: &str, now: Instant) -> Duration {
        match self.last_dispatch.get(domain) {
            None => Duration::ZERO,
            Some(last) => self
                .min_interval
                .saturating_sub(now.duration_since(*last)),
        }
    }

    /// Record an actual dispatch to `domain` at `now`.
    ///
    /// Must be called exactly once per dispatch, at the instant the request
    /// is initiated — never speculatively.
    pub fn record_dispatch(&mut self, domain: &str, now: Instant) {
        self.last_dispatch.insert(domain.to_string(), now);
    }
}
