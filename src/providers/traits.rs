//! Provider trait for upstream LLM backends.
//!
//! One implementation per [`ProviderId`]. The gateway only depends on the
//! call signature and on the call being slow or failing at times; the
//! actual HTTP plumbing belongs to the implementation.
//!
//! # Cancellation
//!
//! `call` futures must be cancel-safe: the gateway drops the future when
//! the inbound request is cancelled or times out, and nothing the provider
//! produced afterwards is used or cached.
//!
//! # Example
//!
//! ```ignore
//! #[async_trait]
//! impl Provider for MyOpenAiClient {
//!     fn id(&self) -> ProviderId {
//!         ProviderId::OpenAI
//!     }
//!
//!     async fn call(&self, request: &Request) -> Result<Completion> {
//!         let text = self.http_complete(&request.model, &request.prompt).await
//!             .map_err(|e| GatewayError::ProviderFailure(e.to_string()))?;
//!         Ok(Completion::new(text))
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::Result;
use crate::types::{Completion, ProviderId, Request};

/// An upstream LLM backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Which provider slot this implementation fills.
    fn id(&self) -> ProviderId;

    /// Provider name for logging/debugging.
    fn name(&self) -> &str {
        self.id().as_str()
    }

    /// Run one completion.
    ///
    /// Return `usage: None` when the backend reports no token counts; the
    /// dispatcher then approximates them. Failures should be
    /// [`GatewayError::ProviderFailure`](crate::GatewayError::ProviderFailure).
    async fn call(&self, request: &Request) -> Result<Completion>;
}
