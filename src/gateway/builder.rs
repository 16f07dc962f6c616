//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use super::Gateway;
use crate::cache::{CacheConfig, ResponseCache};
use crate::config::Config;
use crate::limiter::{MAX_WINDOW, RateLimitConfig, RateLimiter};
use crate::providers::{Provider, ProviderRegistry, SimulatedProvider};
use crate::{GatewayError, Result};

/// Default per-request provider timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for configuring gateway instances.
pub struct GatewayBuilder {
    cache: CacheConfig,
    rate_limit: RateLimitConfig,
    request_timeout: Duration,
    providers: ProviderRegistry,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self {
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            providers: ProviderRegistry::new(),
        }
    }

    /// Builder pre-filled from a loaded [`Config`].
    ///
    /// Providers listed under `[providers]` become simulated providers; an
    /// empty section registers all four with default latencies.
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::new()
            .cache(config.cache.to_cache_config())
            .rate_limit(config.rate_limit.to_rate_limit_config())
            .request_timeout(Duration::from_secs(config.gateway.request_timeout_secs));

        let configured = config.providers.configured();
        if configured.is_empty() {
            builder = builder.simulated_providers();
        } else {
            for (id, provider) in configured {
                let mut simulated = SimulatedProvider::new(id);
                if let Some(ms) = provider.latency_ms {
                    simulated = simulated.with_latency(Duration::from_millis(ms));
                }
                builder = builder.provider(Arc::new(simulated));
            }
        }
        builder
    }

    /// Configure the response cache (default: 1,000 entries, 1 hour TTL).
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Configure per-client rate limiting (default: 100 per 60s).
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Upper bound on a single provider call (default: 30s).
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Register a provider, replacing any earlier one with the same id.
    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.register(provider);
        self
    }

    /// Register simulated providers for every provider id.
    pub fn simulated_providers(mut self) -> Self {
        for provider in SimulatedProvider::all() {
            self.providers.register(provider);
        }
        self
    }

    pub fn build(self) -> Result<Gateway> {
        if self.providers.is_empty() {
            return Err(GatewayError::Configuration(
                "no provider configured".to_string(),
            ));
        }
        if self.rate_limit.limit == 0 {
            return Err(GatewayError::Configuration(
                "rate limit must be positive".to_string(),
            ));
        }
        if self.rate_limit.window.is_zero() {
            return Err(GatewayError::Configuration(
                "rate limit window must be positive".to_string(),
            ));
        }
        if self.rate_limit.window > MAX_WINDOW {
            return Err(GatewayError::Configuration(format!(
                "rate limit window must not exceed {}s",
                MAX_WINDOW.as_secs()
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(GatewayError::Configuration(
                "request timeout must be positive".to_string(),
            ));
        }

        Ok(Gateway::new(
            ResponseCache::new(&self.cache),
            RateLimiter::new(&self.rate_limit),
            self.providers,
            self.request_timeout,
        ))
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
