//! Response types

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::ProviderId;

/// Normalized response returned to clients.
///
/// `cached` is only ever set on the copy handed out for a cache hit; the
/// entry stored in the cache always carries `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub provider: ProviderId,
    pub model: String,
    pub response: String,
    pub tokens_used: u32,
    pub response_time_ms: f64,
    pub cached: bool,
}

/// Raw result of a provider call, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Token usage statistics as reported by a provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Token estimate used when a provider reports no usage: one token per
/// four bytes of prompt text.
pub fn approximate_tokens(prompt: &str) -> u32 {
    u32::try_from(prompt.len() / 4).unwrap_or(u32::MAX)
}

/// Liveness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    /// RFC 3339 timestamp.
    pub time: String,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}
