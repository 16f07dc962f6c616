//! Switchyard - caching, rate-limiting request gateway for LLM providers
//!
//! A [`Gateway`] sits in front of several LLM backends. For each request it
//! checks the client's sliding-window rate limit, serves identical requests
//! from a bounded TTL cache, dispatches misses to the matching [`Provider`]
//! and keeps process-wide counters for the metrics report.
//!
//! The transport is up to the host: hand each inbound request to
//! [`Gateway::handle_payload`] (raw JSON) or [`Gateway::handle`] together
//! with the client's identity and a cancellation token.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use switchyard::{CacheConfig, Gateway, RateLimitConfig, Request};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> switchyard::Result<()> {
//!     let gateway = Gateway::builder()
//!         .simulated_providers()
//!         .cache(CacheConfig::new().ttl(Duration::from_secs(600)))
//!         .rate_limit(RateLimitConfig::new().limit(10))
//!         .build()?;
//!
//!     let request = Request::new("anthropic", "claude-sonnet-4", "What is a sliding window?");
//!     let response = gateway
//!         .handle("203.0.113.7", request, &CancellationToken::new())
//!         .await?;
//!
//!     println!("{} (cached: {})", response.response, response.cached);
//!     println!("{:?}", gateway.metrics_report());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod limiter;
pub mod providers;
pub mod stats;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheKey, ResponseCache};
pub use config::Config;
pub use error::{ErrorKind, ErrorPayload, GatewayError, Result};
pub use gateway::{Gateway, GatewayBuilder};
pub use limiter::{Admission, MAX_WINDOW, RateLimitConfig, RateLimiter};
pub use providers::{Provider, ProviderRegistry, SimulatedProvider};
pub use stats::{Metrics, MetricsReport, MetricsSnapshot};

// Re-export all types
pub use types::{Completion, HealthStatus, ProviderId, Request, Response, Usage};
