//! Per-client sliding-window rate limiting.
//!
//! Each client key owns an ordered list of the instants at which its
//! requests were admitted. A call first drops every instant at or before
//! `now - window`, then admits only if fewer than `limit` remain. Rejected
//! calls are not recorded, so a client hammering the gateway does not push
//! its own window forward.
//!
//! Windows live in a moka map with `time_to_idle` of at least one window:
//! a key idle that long holds only expired instants, so dropping it changes
//! nothing but memory. Each window sits behind its own mutex, so checks for
//! unrelated keys never contend and two concurrent checks for the same key
//! cannot both take the last slot.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use moka::sync::Cache;
use tokio::time::Instant;

use crate::telemetry;

/// Lower bound on how long an idle window is kept.
const MIN_IDLE: Duration = Duration::from_secs(1);

/// Longest accepted window (365 days). The idle expiry of the per-client
/// map must cover a whole window, and moka rejects idle periods past
/// 1000 years.
pub const MAX_WINDOW: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Configuration for the rate limiter.
///
/// ```rust
/// # use switchyard::RateLimitConfig;
/// # use std::time::Duration;
/// let config = RateLimitConfig::new()
///     .limit(20)
///     .window(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests admitted per client within any trailing window. Default: 100.
    pub limit: usize,
    /// Length of the trailing window. Default: 60s.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Admitted; `remaining` more requests fit in the current window.
    Allowed { remaining: usize },
    /// Rejected; a slot frees up after `retry_after` (unknown when the
    /// limit is zero).
    Rejected { retry_after: Option<Duration> },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed { .. })
    }
}

type Window = Arc<Mutex<VecDeque<Instant>>>;

/// Sliding-window rate limiter keyed by client identity.
pub struct RateLimiter {
    windows: Cache<String, Window>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let windows = Cache::builder()
            .time_to_idle(config.window.max(MIN_IDLE))
            .build();
        Self {
            windows,
            limit: config.limit,
            window: config.window,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admit or reject one request from `key`.
    pub fn allow(&self, key: &str) -> bool {
        self.acquire(key).is_allowed()
    }

    /// Admit or reject one request from `key`, with detail.
    ///
    /// Admission records the current instant in the key's window.
    pub fn acquire(&self, key: &str) -> Admission {
        let window = self
            .windows
            .get_with_by_ref(key, || Arc::new(Mutex::new(VecDeque::new())));
        let mut admitted = window.lock().unwrap_or_else(PoisonError::into_inner);

        let now = Instant::now();
        if let Some(window_start) = now.checked_sub(self.window) {
            while admitted.front().is_some_and(|t| *t <= window_start) {
                admitted.pop_front();
            }
        }

        if admitted.len() >= self.limit {
            metrics::counter!(telemetry::RATE_LIMITED_TOTAL).increment(1);
            let retry_after = admitted
                .front()
                .map(|oldest| (*oldest + self.window).saturating_duration_since(now));
            return Admission::Rejected { retry_after };
        }

        admitted.push_back(now);
        Admission::Allowed {
            remaining: self.limit - admitted.len(),
        }
    }

    /// Requests `key` could still make right now without being rejected.
    pub fn remaining(&self, key: &str) -> usize {
        let Some(window) = self.windows.get(key) else {
            return self.limit;
        };
        let admitted = window.lock().unwrap_or_else(PoisonError::into_inner);
        let live = match Instant::now().checked_sub(self.window) {
            Some(window_start) => admitted.iter().filter(|t| **t > window_start).count(),
            None => admitted.len(),
        };
        self.limit.saturating_sub(live)
    }
}
