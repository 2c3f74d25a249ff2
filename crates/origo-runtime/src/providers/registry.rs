//! Provider pool: active-provider filtering and the HTTP call path.
//!
//! The retry schedule is part of the observable contract, so it is written
//! as an explicit bounded loop rather than hidden in middleware: after a
//! failed attempt the call sleeps `min(250ms * 2^attempt, 2s)` and tries
//! again until the retry budget is spent; the terminal failure becomes a
//! [`ProviderCallResult::Error`], never an exception to the caller.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use origo_core::ProviderCallResult;

use super::{PreparedRequest, ProviderError};
use crate::config::{ConsensusConfig, ProviderConfig, MIN_CONSENSUS_SCORE};
use crate::normalize;

/// Ceiling of the backoff schedule.
const BACKOFF_CAP: Duration = Duration::from_millis(2000);

/// Base delay of the backoff schedule.
const BACKOFF_BASE_MS: u64 = 250;

/// Backoff before retry number `attempt` (0-based): 250ms, 500ms, 1s, 2s,
/// capped at 2s.
pub fn backoff_delay(attempt: u32) -> Duration {
    let millis = BACKOFF_BASE_MS.saturating_mul(1u64 << attempt.min(16));
    Duration::from_millis(millis).min(BACKOFF_CAP)
}

/// The orchestrator's view of the provider fleet.
///
/// One implementation speaks HTTP; tests substitute their own. Either way a
/// call always resolves to a [`ProviderCallResult`] — skip, success or
/// terminal error — so the consensus step can wait for every provider to
/// settle.
#[async_trait]
pub trait ProviderPool: Send + Sync {
    /// Providers whose required fields are all present.
    fn active(&self) -> Vec<ProviderConfig>;

    /// Call one provider with the prepared case prompt.
    async fn call(&self, provider: &ProviderConfig, prompt: &str) -> ProviderCallResult;
}

/// HTTP-backed provider pool.
pub struct HttpProviderPool {
    providers: Vec<ProviderConfig>,
    client: reqwest::Client,
    max_retries: u32,
    call_timeout: Duration,
}

impl HttpProviderPool {
    /// Build a pool from the consensus configuration.
    pub fn from_config(config: &ConsensusConfig) -> Self {
        Self {
            providers: config.providers.clone(),
            client: reqwest::Client::new(),
            max_retries: config.max_retries,
            call_timeout: config.call_timeout,
        }
    }

    /// One HTTP attempt; timeouts are reported as such and count toward the
    /// retry budget like any other transport failure.
    async fn attempt(&self, prepared: &PreparedRequest) -> Result<serde_json::Value, ProviderError> {
        let mut request = self
            .client
            .post(&prepared.url)
            .timeout(self.call_timeout)
            .json(&prepared.body);
        for (name, value) in &prepared.headers {
            request = request.header(*name, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.call_timeout)
            } else {
                ProviderError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: truncate(&message, 500),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl ProviderPool for HttpProviderPool {
    fn active(&self) -> Vec<ProviderConfig> {
        self.providers.iter().filter(|p| p.is_active()).cloned().collect()
    }

    async fn call(&self, provider: &ProviderConfig, prompt: &str) -> ProviderCallResult {
        let missing = provider.missing_fields();
        if !missing.is_empty() {
            return ProviderCallResult::Skipped {
                provider_id: provider.id.clone(),
                reason: format!("missing {}", missing.join(", ")),
            };
        }

        let credential = provider.credential();
        if provider.dialect.requires_model_and_credential() && credential.is_none() {
            return ProviderCallResult::Skipped {
                provider_id: provider.id.clone(),
                reason: "credential unavailable".to_string(),
            };
        }

        let prepared = match provider.dialect.prepare(provider, credential.as_ref(), prompt) {
            Ok(prepared) => prepared,
            Err(e) => {
                return ProviderCallResult::Skipped {
                    provider_id: provider.id.clone(),
                    reason: e.to_string(),
                }
            }
        };

        let started = Instant::now();
        let mut attempt: u32 = 0;
        loop {
            match self.attempt(&prepared).await {
                Ok(body) => {
                    return match provider.dialect.unwrap_reply(&body) {
                        Ok(text) => {
                            let vote = normalize::normalize_reply(&text, MIN_CONSENSUS_SCORE);
                            ProviderCallResult::Ok {
                                provider_id: provider.id.clone(),
                                decision: vote.decision,
                                confidence: vote.confidence,
                                rationale: vote.rationale,
                                latency_ms: started.elapsed().as_millis() as u64,
                            }
                        }
                        Err(e) => {
                            tracing::warn!(provider = %provider.id, error = %e, "Unusable provider reply");
                            ProviderCallResult::Error {
                                provider_id: provider.id.clone(),
                                message: e.to_string(),
                            }
                        }
                    };
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    tracing::debug!(
                        provider = %provider.id,
                        attempt,
                        error = %e,
                        "Provider call failed; backing off"
                    );
                    tokio::time::sleep(backoff_delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        provider = %provider.id,
                        attempts = attempt + 1,
                        error = %e,
                        "Provider call failed terminally"
                    );
                    return ProviderCallResult::Error {
                        provider_id: provider.id.clone(),
                        message: e.to_string(),
                    };
                }
            }
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &text[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, ProviderDialect};

    #[test]
    fn test_backoff_schedule_is_exact() {
        assert_eq!(backoff_delay(0), Duration::from_millis(250));
        assert_eq!(backoff_delay(1), Duration::from_millis(500));
        assert_eq!(backoff_delay(2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(3), Duration::from_millis(2000));
        assert_eq!(backoff_delay(4), Duration::from_millis(2000));
        assert_eq!(backoff_delay(30), Duration::from_millis(2000));
    }

    fn inactive_provider() -> ProviderConfig {
        ProviderConfig {
            id: "no-creds".to_string(),
            display_name: None,
            dialect: ProviderDialect::Anthropic,
            endpoint: Some("https://api.anthropic.com/v1/messages".to_string()),
            model: None,
            api_key: None,
            temperature: None,
        }
    }

    #[tokio::test]
    async fn test_inactive_provider_is_skipped_without_network() {
        let pool = HttpProviderPool::from_config(&ConsensusConfig {
            providers: vec![inactive_provider()],
            ..ConsensusConfig::default()
        });

        assert!(pool.active().is_empty());

        let result = pool.call(&inactive_provider(), "case").await;
        match result {
            ProviderCallResult::Skipped { reason, .. } => {
                assert!(reason.contains("model"));
            }
            other => panic!("expected Skipped, got {:?}", other),
        }
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "éééé";
        let truncated = truncate(text, 3);
        assert!(truncated.starts_with('é'));
    }
}
