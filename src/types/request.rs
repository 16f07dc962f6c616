//! Inbound request type

use serde::{Deserialize, Serialize};

use crate::{GatewayError, Result};

/// A single completion request as received from a client.
///
/// `provider` stays a plain string until dispatch so that an unknown
/// identifier surfaces as [`GatewayError::UnsupportedProvider`] rather than
/// a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub prompt: String,
    pub model: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Request {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            provider: provider.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    /// Cap the completion length; `0` leaves it unset.
    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = (max > 0).then_some(max);
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Decode and validate a JSON request body.
    ///
    /// Decode failures surface as [`GatewayError::Json`], failed validation
    /// as [`GatewayError::InvalidRequest`]; both are `invalid_request` to
    /// the client. `"max_tokens": 0` means unset.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let mut request: Request = serde_json::from_slice(body)?;
        request.max_tokens = request.max_tokens.filter(|&n| n > 0);
        request.validate()?;
        Ok(request)
    }

    /// Check field-level constraints. Provider support is checked at dispatch.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "prompt must not be empty".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "model must not be empty".to_string(),
            ));
        }
        if let Some(temp) = self.temperature
            && !(temp.is_finite() && temp >= 0.0)
        {
            return Err(GatewayError::InvalidRequest(format!(
                "temperature must be a non-negative number, got {temp}"
            )));
        }
        Ok(())
    }
}
