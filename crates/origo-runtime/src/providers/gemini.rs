//! Google Gemini generateContent dialect.
//!
//! The API key travels as a query parameter rather than a header, so the
//! credential is exposed while building the URL.

use serde::Deserialize;
use serde_json::json;

use super::{credential_of, endpoint_of, ApiCredential, PreparedRequest, ProviderError};
use crate::config::ProviderConfig;

pub(super) fn prepare(
    provider: &ProviderConfig,
    credential: Option<&ApiCredential>,
    prompt: &str,
) -> Result<PreparedRequest, ProviderError> {
    let credential = credential_of(provider, credential)?;
    let endpoint = endpoint_of(provider)?;

    let separator = if endpoint.contains('?') { '&' } else { '?' };
    let url = format!("{}{}key={}", endpoint, separator, credential.expose());

    let mut body = json!({
        "contents": [
            { "parts": [ { "text": prompt } ] }
        ]
    });
    if let Some(temperature) = provider.temperature {
        body["generationConfig"] = json!({ "temperature": temperature });
    }

    Ok(PreparedRequest {
        url,
        headers: vec![],
        body,
    })
}

/// Reply envelope: first candidate's content parts.
#[derive(Debug, Deserialize)]
struct Reply {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

pub(super) fn unwrap_reply(body: &serde_json::Value) -> Result<String, ProviderError> {
    let reply: Reply = serde_json::from_value(body.clone())
        .map_err(|e| ProviderError::ParseError(e.to_string()))?;

    let text = reply
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::ParseError(
            "reply contains no candidates".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderDialect;
    use crate::providers::test_support::provider;

    #[test]
    fn test_key_is_a_query_parameter() {
        let p = provider("gemini", ProviderDialect::Gemini);
        let credential = p.credential();
        let prepared = prepare(&p, credential.as_ref(), "assess this case").unwrap();

        assert!(prepared.url.ends_with("?key=test-key"));
        assert!(prepared.headers.is_empty());
        assert_eq!(
            prepared.body["contents"][0]["parts"][0]["text"],
            "assess this case"
        );
    }

    #[test]
    fn test_unwrap_joins_parts() {
        let body = serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "incon" }, { "text": "clusive" } ] } }
            ]
        });
        assert_eq!(unwrap_reply(&body).unwrap(), "inconclusive");
    }

    #[test]
    fn test_unwrap_rejects_empty_candidates() {
        let body = serde_json::json!({ "candidates": [] });
        assert!(unwrap_reply(&body).is_err());
    }
}
