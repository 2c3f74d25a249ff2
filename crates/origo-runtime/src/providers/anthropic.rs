//! Anthropic messages-API dialect.

use serde::Deserialize;
use serde_json::json;

use super::{credential_of, endpoint_of, model_of, ApiCredential, PreparedRequest, ProviderError};
use crate::config::ProviderConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

pub(super) fn prepare(
    provider: &ProviderConfig,
    credential: Option<&ApiCredential>,
    prompt: &str,
) -> Result<PreparedRequest, ProviderError> {
    let credential = credential_of(provider, credential)?;

    let mut body = json!({
        "model": model_of(provider)?,
        "max_tokens": MAX_TOKENS,
        "messages": [
            { "role": "user", "content": prompt }
        ]
    });
    if let Some(temperature) = provider.temperature {
        body["temperature"] = json!(temperature);
    }

    Ok(PreparedRequest {
        url: endpoint_of(provider)?,
        headers: vec![
            ("x-api-key", credential.expose().to_string()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
        ],
        body,
    })
}

/// Reply envelope: text blocks under `content`.
#[derive(Debug, Deserialize)]
struct Reply {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

pub(super) fn unwrap_reply(body: &serde_json::Value) -> Result<String, ProviderError> {
    let reply: Reply = serde_json::from_value(body.clone())
        .map_err(|e| ProviderError::ParseError(e.to_string()))?;

    let text = reply
        .content
        .into_iter()
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(ProviderError::ParseError(
            "reply contains no text blocks".to_string(),
        ));
    }
    Ok(text)
}
