//! Simulated providers.
//!
//! Stand-ins for the real backends: each sleeps for a fixed latency and
//! echoes the prompt. They report no usage, so token counts come from the
//! dispatcher's approximation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::traits::Provider;
use crate::Result;
use crate::types::{Completion, ProviderId, Request};

/// Echoing provider with a fixed, configurable latency.
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    id: ProviderId,
    latency: Duration,
}

impl SimulatedProvider {
    /// Simulated provider with the default latency for `id`.
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            latency: Self::default_latency(id),
        }
    }

    /// Override the simulated latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn default_latency(id: ProviderId) -> Duration {
        let ms = match id {
            ProviderId::OpenAI => 500,
            ProviderId::Anthropic => 450,
            ProviderId::Google => 400,
            ProviderId::DeepSeek => 350,
        };
        Duration::from_millis(ms)
    }

    /// One simulated provider per [`ProviderId`], default latencies.
    pub fn all() -> Vec<Arc<dyn Provider>> {
        ProviderId::ALL
            .into_iter()
            .map(|id| Arc::new(Self::new(id)) as Arc<dyn Provider>)
            .collect()
    }
}

#[async_trait]
impl Provider for SimulatedProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn call(&self, request: &Request) -> Result<Completion> {
        tokio::time::sleep(self.latency).await;
        Ok(Completion::new(format!(
            "{} response to: {}",
            self.id.display_name(),
            request.prompt
        )))
    }
}
