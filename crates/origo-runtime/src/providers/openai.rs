//! OpenAI-style chat-completions dialect.

use serde::Deserialize;
use serde_json::json;

use super::{credential_of, endpoint_of, model_of, ApiCredential, PreparedRequest, ProviderError};
use crate::config::ProviderConfig;

pub(super) fn prepare(
    provider: &ProviderConfig,
    credential: Option<&ApiCredential>,
    prompt: &str,
) -> Result<PreparedRequest, ProviderError> {
    let credential = credential_of(provider, credential)?;

    let mut body = json!({
        "model": model_of(provider)?,
        "messages": [
            { "role": "user", "content": prompt }
        ]
    });
    if let Some(temperature) = provider.temperature {
        body["temperature"] = json!(temperature);
    }

    Ok(PreparedRequest {
        url: endpoint_of(provider)?,
        headers: vec![(
            "authorization",
            format!("Bearer {}", credential.expose()),
        )],
        body,
    })
}

/// Reply envelope: first choice's message content.
#[derive(Debug, Deserialize)]
struct Reply {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

pub(super) fn unwrap_reply(body: &serde_json::Value) -> Result<String, ProviderError> {
    let reply: Reply = serde_json::from_value(body.clone())
        .map_err(|e| ProviderError::ParseError(e.to_string()))?;

    reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| ProviderError::ParseError("reply contains no choices".to_string()))
}
