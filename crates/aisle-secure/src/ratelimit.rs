//! Injected rate limiting.
//!
//! The limiter is a service behind a trait so a multi-process
//! deployment can swap the in-memory implementation for a shared
//! store. Internal limiter failures are fail-open: the operation is
//! allowed and the event logged, documented policy rather than
//! accident.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited,
    /// The limiter itself failed; callers treat this as allowed.
    Unavailable,
}

/// Per-caller rate limiting, keyed by user id.
pub trait RateLimiter: Send + Sync {
    fn check(&self, key: &str) -> RateDecision;
}

/// A limiter that never limits, for tests and trusted internal wiring.
#[derive(Debug, Default)]
pub struct NoopLimiter;

impl RateLimiter for NoopLimiter {
    fn check(&self, _key: &str) -> RateDecision {
        RateDecision::Allowed
    }
}

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window in-memory limiter: N operations per window per key,
/// window reset lazily on the first request after expiry. Best-effort
/// and per-process only.
pub struct FixedWindowLimiter {
    max: u32,
    window: Duration,
    state: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            state: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, key: &str) -> RateDecision {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => return RateDecision::Unavailable,
        };

        let now = Instant::now();
        let entry = state.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max {
            return RateDecision::Limited;
        }
        entry.count += 1;
        RateDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_after_max_within_window() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert_eq!(limiter.check("alice"), RateDecision::Allowed);
        }
        assert_eq!(limiter.check("alice"), RateDecision::Limited);
        // Other keys are unaffected.
        assert_eq!(limiter.check("bob"), RateDecision::Allowed);
    }

    #[test]
    fn window_resets_lazily() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_millis(10));
        assert_eq!(limiter.check("alice"), RateDecision::Allowed);
        assert_eq!(limiter.check("alice"), RateDecision::Limited);
        std::thread::sleep(Duration::from_millis(15));
        assert_eq!(limiter.check("alice"), RateDecision::Allowed);
    }
}
