//! Request orchestration.
//!
//! [`Gateway`] runs every inbound request through the same pipeline:
//!
//! ```text
//! received ──► rate limiter ──► rejected ───────────────────────┐
//!                  │ admitted                                   │
//!                  ▼                                            │
//!            validate + resolve provider ──► invalid/unsupported┤
//!                  │                                            │
//!                  ▼                                            │
//!            cache lookup ──► hit ──► cached copy ──────────────┼──► respond
//!                  │ miss                                       │
//!                  ▼                                            │
//!            dispatch (raced against cancel + timeout) ─► error ┤
//!                  │ ok                                         │
//!                  ▼                                            │
//!            cache store ──► fresh response ────────────────────┘
//! ```
//!
//! Every request bumps `total_requests` once on arrival and ends in exactly
//! one of: a hit, a miss followed by success, or an error (a miss followed
//! by a provider failure counts both the miss and the error). Error outcomes
//! never touch the cache.
//!
//! The cache, the limiter and the counters each synchronize on their own;
//! no lock is held across the provider call.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::GatewayBuilder;
use crate::cache::{CacheKey, ResponseCache};
use crate::config::Config;
use crate::limiter::{Admission, RateLimiter};
use crate::providers::ProviderRegistry;
use crate::stats::{Metrics, MetricsReport};
use crate::types::{HealthStatus, Request, Response};
use crate::{GatewayError, Result};

/// The gateway engine. Share it across request tasks behind an `Arc`.
pub struct Gateway {
    cache: ResponseCache,
    limiter: RateLimiter,
    metrics: Metrics,
    providers: ProviderRegistry,
    request_timeout: Duration,
}

impl Gateway {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Build a gateway from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        GatewayBuilder::from_config(config).build()
    }

    pub(crate) fn new(
        cache: ResponseCache,
        limiter: RateLimiter,
        providers: ProviderRegistry,
        request_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            limiter,
            metrics: Metrics::new(),
            providers,
            request_timeout,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Handle an already-decoded request from `client`.
    ///
    /// `cancel` is the inbound request's cancellation signal; firing it
    /// while the provider call is in flight abandons the call.
    #[instrument(skip(self, request, cancel), fields(provider = %request.provider, model = %request.model))]
    pub async fn handle(
        &self,
        client: &str,
        request: Request,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        self.metrics.record_request();
        let outcome = match self.admit(client) {
            Ok(admitted_at) => self.serve(&request, admitted_at, cancel).await,
            Err(e) => Err(e),
        };
        self.finish(outcome)
    }

    /// Handle a raw JSON request body from `client`.
    ///
    /// Admission is checked before the body is decoded, so a rate-limited
    /// client gets `RateLimited` even for a malformed payload.
    #[instrument(skip(self, body, cancel), fields(body_len = body.len()))]
    pub async fn handle_payload(
        &self,
        client: &str,
        body: &[u8],
        cancel: &CancellationToken,
    ) -> Result<Response> {
        self.metrics.record_request();
        let outcome = async {
            let admitted_at = self.admit(client)?;
            let request = Request::from_json(body)?;
            self.serve(&request, admitted_at, cancel).await
        }
        .await;
        self.finish(outcome)
    }

    /// Current counters, formatted for the metrics endpoint.
    pub fn metrics_report(&self) -> MetricsReport {
        self.metrics.snapshot().report()
    }

    /// Liveness report; always healthy while the process runs.
    pub fn health(&self) -> HealthStatus {
        HealthStatus::healthy()
    }

    fn admit(&self, client: &str) -> Result<Instant> {
        match self.limiter.acquire(client) {
            Admission::Allowed { .. } => Ok(Instant::now()),
            Admission::Rejected { retry_after } => Err(GatewayError::RateLimited { retry_after }),
        }
    }

    async fn serve(
        &self,
        request: &Request,
        admitted_at: Instant,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        request.validate()?;
        let provider = self.providers.resolve(&request.provider)?;
        let key = CacheKey::new(provider, request);

        if let Some(mut hit) = self.cache.get(&key) {
            self.metrics.record_hit();
            debug!(key = key.fingerprint(), "cache hit");
            hit.cached = true;
            return Ok(hit);
        }
        self.metrics.record_miss();
        debug!(key = key.fingerprint(), "cache miss");

        let mut response = self.dispatch(request, cancel).await?;
        response.response_time_ms = admitted_at.elapsed().as_secs_f64() * 1000.0;
        self.cache.put(key, response.clone(), self.cache.ttl());
        Ok(response)
    }

    /// Provider call raced against cancellation and the request timeout.
    async fn dispatch(&self, request: &Request, cancel: &CancellationToken) -> Result<Response> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GatewayError::Cancelled),
            outcome = tokio::time::timeout(self.request_timeout, self.providers.dispatch(request)) => {
                outcome.map_err(|_| GatewayError::Timeout(self.request_timeout))?
            }
        }
    }

    fn finish(&self, outcome: Result<Response>) -> Result<Response> {
        if let Err(ref e) = outcome {
            self.metrics.record_error();
            warn!(kind = ?e.kind(), error = %e, "request failed");
        }
        outcome
    }
}
