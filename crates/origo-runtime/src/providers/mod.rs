//! Reasoning-provider adapters.
//!
//! Each wire dialect owns exactly one request-builder and one
//! response-unwrapper; all of them converge on a plain reply text that
//! [`crate::normalize`] turns into a vote. The orchestrator only ever sees
//! [`origo_core::ProviderCallResult`] values and stays provider-agnostic.
//!
//! ## Security
//!
//! Credentials are handled through the [`secrets`] module and only exposed
//! at the point a header is built.

mod anthropic;
mod gemini;
mod generic;
mod openai;
mod registry;
pub mod secrets;

pub use registry::{backoff_delay, HttpProviderPool, ProviderPool};
pub use secrets::{ApiCredential, CredentialSource};

use std::time::Duration;

use thiserror::Error;

use crate::config::{ProviderConfig, ProviderDialect};

/// Errors from a single provider call attempt.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Unexpected reply shape: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Transport and HTTP-status failures are retried; a 2xx reply with an
    /// alien shape is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::HttpError(_)
                | ProviderError::ApiError { .. }
                | ProviderError::Timeout(_)
        )
    }
}

/// A dialect-shaped HTTP request, ready to send.
pub(crate) struct PreparedRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: serde_json::Value,
}

impl ProviderDialect {
    /// Shape the provider-agnostic prompt into this dialect's request.
    pub(crate) fn prepare(
        &self,
        provider: &ProviderConfig,
        credential: Option<&ApiCredential>,
        prompt: &str,
    ) -> Result<PreparedRequest, ProviderError> {
        match self {
            ProviderDialect::Anthropic => anthropic::prepare(provider, credential, prompt),
            ProviderDialect::OpenAi => openai::prepare(provider, credential, prompt),
            ProviderDialect::Gemini => gemini::prepare(provider, credential, prompt),
            ProviderDialect::Generic => generic::prepare(provider, credential, prompt),
        }
    }

    /// Unwrap this dialect's reply envelope into plain reply text.
    pub(crate) fn unwrap_reply(
        &self,
        body: &serde_json::Value,
    ) -> Result<String, ProviderError> {
        match self {
            ProviderDialect::Anthropic => anthropic::unwrap_reply(body),
            ProviderDialect::OpenAi => openai::unwrap_reply(body),
            ProviderDialect::Gemini => gemini::unwrap_reply(body),
            ProviderDialect::Generic => generic::unwrap_reply(body),
        }
    }
}

pub(crate) fn endpoint_of(provider: &ProviderConfig) -> Result<String, ProviderError> {
    provider
        .endpoint
        .clone()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ProviderError::NotConfigured(format!("{}: endpoint missing", provider.id)))
}

pub(crate) fn model_of(provider: &ProviderConfig) -> Result<String, ProviderError> {
    provider
        .model
        .clone()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ProviderError::NotConfigured(format!("{}: model missing", provider.id)))
}

pub(crate) fn credential_of<'a>(
    provider: &ProviderConfig,
    credential: Option<&'a ApiCredential>,
) -> Result<&'a ApiCredential, ProviderError> {
    credential
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ProviderError::NotConfigured(format!("{}: credential missing", provider.id)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::{ProviderConfig, ProviderDialect};

    pub fn provider(id: &str, dialect: ProviderDialect) -> ProviderConfig {
        ProviderConfig {
            id: id.to_string(),
            display_name: None,
            dialect,
            endpoint: Some(format!("https://{}.example.com/v1/assess", id)),
            model: Some("test-model".to_string()),
            api_key: Some("test-key".to_string()),
            temperature: Some(0.0),
        }
    }
}
