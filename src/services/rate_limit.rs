//! Client-side login throttling.
//!
//! Attempts are counted per email in memory only, so restarting the client
//! clears them. This is a convenience for the person at the desk and not a
//! security control: the auth provider enforces the real limits.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::config::LoginConfig;

/// Failed attempts recorded for one email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginAttempt {
    pub count: u32,
    pub first_attempt: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// Whole minutes (rounded up) until the window expires
    Blocked { remaining_minutes: i64 },
}

#[derive(Debug, Clone)]
pub struct LoginRateLimiter {
    attempts: HashMap<String, LoginAttempt>,
    max_attempts: u32,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            attempts: HashMap::new(),
            max_attempts,
            window,
        }
    }

    pub fn from_config(config: &LoginConfig) -> Self {
        Self::new(config.max_attempts, Duration::minutes(config.lockout_minutes))
    }

    /// Decide whether a login for `email` may go ahead at `now`.
    ///
    /// An entry whose window has passed is dropped here.
    pub fn check(&mut self, email: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let Some(attempt) = self.attempts.get(email).copied() else {
            return RateLimitDecision::Allowed;
        };

        let elapsed = now - attempt.first_attempt;
        if elapsed > self.window {
            self.attempts.remove(email);
            return RateLimitDecision::Allowed;
        }

        if attempt.count >= self.max_attempts {
            let remaining_ms = (self.window - elapsed).num_milliseconds();
            let remaining_minutes = (remaining_ms + 59_999) / 60_000;
            tracing::warn!("Login for {} blocked, {} attempts", email, attempt.count);
            return RateLimitDecision::Blocked { remaining_minutes };
        }

        RateLimitDecision::Allowed
    }

    pub fn record_failure(&mut self, email: &str, now: DateTime<Utc>) {
        let attempt = self
            .attempts
            .entry(email.to_string())
            .or_insert(LoginAttempt {
                count: 0,
                first_attempt: now,
            });
        attempt.count += 1;
        if attempt.count == 1 {
            attempt.first_attempt = now;
        }
    }

    pub fn record_success(&mut self, email: &str) {
        self.attempts.remove(email);
    }

    pub fn attempts(&self, email: &str) -> Option<&LoginAttempt> {
        self.attempts.get(email)
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::from_config(&LoginConfig::default())
    }
}
