//! Process-wide request counters.
//!
//! [`Metrics`] is the in-process aggregator behind the metrics report. It is
//! separate from the `metrics`-crate emission in [`telemetry`](crate::telemetry):
//! these counters always exist and can be read back, whereas exported
//! metrics are a no-op unless the host installs a recorder.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Monotonic counters for request outcomes.
///
/// Every increment is a single atomic add, so concurrent handlers never
/// lose updates. There is no reset.
#[derive(Debug, Default)]
pub struct Metrics {
    total_requests: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    errors: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Release);
    }

    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Release);
    }

    pub fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Release);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Release);
    }

    /// Read all counters.
    ///
    /// `total_requests` is read last. Requests are counted before they reach
    /// the cache, so the snapshot always satisfies
    /// `cache_hits + cache_misses <= total_requests`.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let cache_hits = self.cache_hits.load(Ordering::Acquire);
        let cache_misses = self.cache_misses.load(Ordering::Acquire);
        let errors = self.errors.load(Ordering::Acquire);
        let total_requests = self.total_requests.load(Ordering::Acquire);
        MetricsSnapshot {
            total_requests,
            cache_hits,
            cache_misses,
            errors,
        }
    }
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub errors: u64,
}

impl MetricsSnapshot {
    /// Cache hit rate as a percentage in `0.0..=100.0`; `0.0` before any lookup.
    pub fn cache_hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / lookups as f64 * 100.0
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests,
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            cache_hit_rate: format!("{:.2}%", self.cache_hit_rate()),
            errors: self.errors,
        }
    }
}

/// Serializable metrics report with the hit rate pre-formatted (`"66.67%"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: String,
    pub errors: u64,
}
