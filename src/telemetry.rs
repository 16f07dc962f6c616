//! Telemetry metric name constants.
//!
//! Centralised metric names for switchyard operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops. The in-process
//! counters behind the metrics report live in [`stats`](crate::stats).
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `switchyard_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider identifier (e.g. "openai", "deepseek")
//! - `status`: outcome: "ok" or "error"

/// Total provider calls dispatched.
///
/// Labels: `provider`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "switchyard_requests_total";

/// Provider call duration in seconds.
///
/// Labels: `provider`.
pub const REQUEST_DURATION_SECONDS: &str = "switchyard_request_duration_seconds";

/// Total tokens consumed, exact or approximated.
///
/// Labels: `provider`.
pub const TOKENS_TOTAL: &str = "switchyard_tokens_total";

/// Total response cache hits.
///
/// Labels: `provider`.
pub const CACHE_HITS_TOTAL: &str = "switchyard_cache_hits_total";

/// Total response cache misses, expired entries included.
///
/// Labels: `provider`.
pub const CACHE_MISSES_TOTAL: &str = "switchyard_cache_misses_total";

/// Total entries evicted to make room in a full cache.
pub const CACHE_EVICTIONS_TOTAL: &str = "switchyard_cache_evictions_total";

/// Total requests rejected by the rate limiter.
pub const RATE_LIMITED_TOTAL: &str = "switchyard_rate_limited_total";
