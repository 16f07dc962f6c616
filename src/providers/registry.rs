//! Provider registry and dispatcher.
//!
//! The `ProviderRegistry` maps each [`ProviderId`] to at most one
//! [`Provider`]. Dispatch resolves the request's provider string, calls the
//! matching backend once and normalizes its [`Completion`] into a
//! [`Response`].
//!
//! # Dispatch Flow
//!
//! ```text
//! Request { provider: "anthropic", .. }
//!                 │
//!                 ▼ parse identifier
//!         ┌─────────────────────┐
//!         │  ProviderRegistry   │ ──► unknown or unregistered:
//!         └─────────┬───────────┘     UnsupportedProvider, no Response built
//!                   │
//!                   ▼
//!         ┌─────────────────────┐
//!         │  Anthropic provider │ ──► Completion { text, usage? }
//!         └─────────┬───────────┘
//!                   │ normalize (usage or prompt.len() / 4)
//!                   ▼
//!             Response { cached: false, .. }
//! ```
//!
//! There is no retry and no fallback: a failed call is returned as-is.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;

use tracing::{instrument, warn};

use crate::telemetry;

use super::traits::Provider;
use crate::types::{Completion, ProviderId, Request, Response, approximate_tokens};
use crate::{GatewayError, Result};

/// Registry of providers, one per [`ProviderId`].
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under its own [`Provider::id`].
    ///
    /// Returns the provider previously registered for that id, if any.
    pub fn register(&mut self, provider: Arc<dyn Provider>) -> Option<Arc<dyn Provider>> {
        self.providers.insert(provider.id(), provider)
    }

    pub fn get(&self, id: ProviderId) -> Option<&Arc<dyn Provider>> {
        self.providers.get(&id)
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.providers.contains_key(&id)
    }

    /// Registered provider ids in declaration order.
    pub fn ids(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.contains(*id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Resolve a wire identifier to a registered provider id.
    ///
    /// Unknown identifiers and known-but-unregistered providers are both
    /// [`GatewayError::UnsupportedProvider`].
    pub fn resolve(&self, name: &str) -> Result<ProviderId> {
        let id: ProviderId = name.parse()?;
        if self.contains(id) {
            Ok(id)
        } else {
            Err(GatewayError::UnsupportedProvider(name.to_string()))
        }
    }

    /// Call the provider named by `request` and normalize its answer.
    #[instrument(skip(self, request), fields(provider = %request.provider, model = %request.model))]
    pub async fn dispatch(&self, request: &Request) -> Result<Response> {
        let id = self.resolve(&request.provider)?;
        let provider = self
            .get(id)
            .ok_or_else(|| GatewayError::Internal(format!("provider {id} vanished")))?;

        let start = Instant::now();
        match provider.call(request).await {
            Ok(completion) => {
                Self::record_request(id, start, true);
                let response = Self::normalize(id, request, completion, start);
                metrics::counter!(telemetry::TOKENS_TOTAL, "provider" => id.as_str())
                    .increment(u64::from(response.tokens_used));
                Ok(response)
            }
            Err(e) => {
                Self::record_request(id, start, false);
                warn!(provider = provider.name(), error = %e, "provider call failed");
                Err(e)
            }
        }
    }

    fn normalize(
        id: ProviderId,
        request: &Request,
        completion: Completion,
        start: Instant,
    ) -> Response {
        let tokens_used = completion
            .usage
            .map(|u| u.total_tokens)
            .unwrap_or_else(|| approximate_tokens(&request.prompt));
        Response {
            provider: id,
            model: request.model.clone(),
            response: completion.text,
            tokens_used,
            response_time_ms: start.elapsed().as_secs_f64() * 1000.0,
            cached: false,
        }
    }

    /// Record request metrics (counter + duration histogram).
    fn record_request(id: ProviderId, start: Instant, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        let elapsed = start.elapsed().as_secs_f64();
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => id.as_str(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "provider" => id.as_str(),
        )
        .record(elapsed);
    }
}
