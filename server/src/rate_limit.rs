//! In-memory rate limiting for chatbot calls.
//!
//! DESIGN
//! ======
//! One global sliding window over `VecDeque<Instant>`: at most `limit` LLM
//! calls in any `window`. The chatbot endpoint is unauthenticated, so there is
//! no per-user bucket.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::http::StatusCode;

use crate::config::parse_or;
use crate::error::ErrorCode;

pub const DEFAULT_GLOBAL_LIMIT: usize = 20;
pub const DEFAULT_GLOBAL_WINDOW_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub global_limit: usize,
    pub global_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { global_limit: DEFAULT_GLOBAL_LIMIT, global_window: Duration::from_secs(DEFAULT_GLOBAL_WINDOW_SECS) }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `RATE_LIMIT_GLOBAL` and `RATE_LIMIT_GLOBAL_WINDOW_SECS`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            global_limit: parse_or(&lookup, "RATE_LIMIT_GLOBAL", DEFAULT_GLOBAL_LIMIT),
            global_window: Duration::from_secs(parse_or(
                &lookup,
                "RATE_LIMIT_GLOBAL_WINDOW_SECS",
                DEFAULT_GLOBAL_WINDOW_SECS,
            )),
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("global rate limit exceeded (max {limit} requests/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
}

impl ErrorCode for RateLimitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::GlobalExceeded { .. } => "E_RATE_LIMITED",
        }
    }

    fn http_status(&self) -> StatusCode {
        StatusCode::TOO_MANY_REQUESTS
    }
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<Mutex<VecDeque<Instant>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self { requests: Arc::new(Mutex::new(VecDeque::new())), config }
    }

    /// Check the global window, then record the request.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::GlobalExceeded`] when the window is full.
    pub fn check_and_record(&self) -> Result<(), RateLimitError> {
        self.check_and_record_at(Instant::now())
    }

    fn check_and_record_at(&self, now: Instant) -> Result<(), RateLimitError> {
        let mut requests = self
            .requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;

        prune_window(&mut requests, now, cfg.global_window);
        if requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }
        requests.push_back(now);
        Ok(())
    }
}

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
