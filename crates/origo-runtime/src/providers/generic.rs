//! Generic HTTP passthrough dialect.
//!
//! For in-house referee services: a plain JSON POST of the prompt, the reply
//! taken as-is. Structured replies (`{"decision": ...}`) survive unchanged as
//! JSON text; anything else is handed to normalization as free text. A
//! credential is optional and sent as a bearer token when present.

use serde_json::json;

use super::{endpoint_of, ApiCredential, PreparedRequest, ProviderError};
use crate::config::ProviderConfig;

pub(super) fn prepare(
    provider: &ProviderConfig,
    credential: Option<&ApiCredential>,
    prompt: &str,
) -> Result<PreparedRequest, ProviderError> {
    let mut body = json!({ "prompt": prompt });
    if let Some(model) = provider.model.as_deref().filter(|m| !m.is_empty()) {
        body["model"] = json!(model);
    }
    if let Some(temperature) = provider.temperature {
        body["temperature"] = json!(temperature);
    }

    let mut headers = Vec::new();
    if let Some(credential) = credential.filter(|c| !c.is_empty()) {
        headers.push((
            "authorization",
            format!("Bearer {}", credential.expose()),
        ));
    }

    Ok(PreparedRequest {
        url: endpoint_of(provider)?,
        headers,
        body,
    })
}

pub(super) fn unwrap_reply(body: &serde_json::Value) -> Result<String, ProviderError> {
    // A bare string reply is the text itself.
    if let Some(text) = body.as_str() {
        return Ok(text.to_string());
    }

    // Conventional text fields used by simple completion services.
    for field in ["text", "content", "response", "completion"] {
        if let Some(text) = body.get(field).and_then(serde_json::Value::as_str) {
            return Ok(text.to_string());
        }
    }

    // Anything else is forwarded verbatim; structured verdicts are picked up
    // during normalization.
    serde_json::to_string(body).map_err(|e| ProviderError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, ProviderDialect};

    fn endpoint_only(id: &str) -> ProviderConfig {
        ProviderConfig {
            id: id.to_string(),
            display_name: None,
            dialect: ProviderDialect::Generic,
            endpoint: Some("https://referee.internal/assess".to_string()),
            model: None,
            api_key: None,
            temperature: None,
        }
    }

    #[test]
    fn test_request_without_credential() {
        let prepared = prepare(&endpoint_only("referee"), None, "case").unwrap();
        assert!(prepared.headers.is_empty());
        assert_eq!(prepared.body["prompt"], "case");
    }

    #[test]
    fn test_structured_reply_forwarded_as_json_text() {
        let body = serde_json::json!({ "decision": "conform", "confidence": 0.9 });
        let text = unwrap_reply(&body).unwrap();
        assert!(text.contains("\"decision\""));
    }

    #[test]
    fn test_text_field_extracted() {
        let body = serde_json::json!({ "text": "the product conforms" });
        assert_eq!(unwrap_reply(&body).unwrap(), "the product conforms");
    }

    #[test]
    fn test_bare_string_reply() {
        let body = serde_json::json!("non-conform");
        assert_eq!(unwrap_reply(&body).unwrap(), "non-conform");
    }
}
