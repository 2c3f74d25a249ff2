//! Consensus-layer configuration.
//!
//! Loaded once at startup and passed explicitly; nothing in the runtime
//! reads ambient globals, so tests can substitute configurations freely.
//! A configuration with zero usable providers is valid and yields the
//! synthetic-consensus path, never an error.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::providers::secrets::ApiCredential;

/// Lower bound of every consensus score. Never exactly zero, so downstream
/// thresholds never compare against a hard 0.
pub const MIN_CONSENSUS_SCORE: f64 = 0.05;

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Wire dialect a provider speaks.
///
/// A closed set: each variant owns one request-builder and one
/// response-unwrapper in `providers/`; the orchestrator never branches on
/// dialects itself.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderDialect {
    /// Anthropic messages API (`x-api-key` header)
    Anthropic,

    /// OpenAI-style chat completions (bearer token)
    OpenAi,

    /// Google Gemini generateContent (key as query parameter)
    Gemini,

    /// Plain JSON POST, reply taken as-is
    Generic,
}

impl ProviderDialect {
    /// Structured dialects need endpoint, model and credential; the generic
    /// passthrough needs only an endpoint.
    pub fn requires_model_and_credential(&self) -> bool {
        !matches!(self, ProviderDialect::Generic)
    }
}

/// One reasoning-provider descriptor.
#[derive(Clone, Deserialize)]
pub struct ProviderConfig {
    /// Stable identifier, used in outcomes and audit records
    pub id: String,

    /// Display name for summaries; falls back to `id`
    #[serde(default)]
    pub display_name: Option<String>,

    /// Wire dialect
    pub dialect: ProviderDialect,

    /// Full request URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Model identifier, where the dialect requires one
    #[serde(default)]
    pub model: Option<String>,

    /// API key; falls back to the `<ID>_API_KEY` environment variable
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sampling temperature passed through to the provider
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl ProviderConfig {
    /// Name shown in consensus summaries and dissent entries.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    /// Environment variable consulted when `api_key` is absent,
    /// e.g. `ANTHROPIC_API_KEY` for id `anthropic`.
    pub fn credential_env_var(&self) -> String {
        let mut var: String = self
            .id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        var.push_str("_API_KEY");
        var
    }

    /// Required fields that are absent. Empty means the provider is active.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.endpoint.as_deref().map_or(true, str::is_empty) {
            missing.push("endpoint");
        }
        if self.dialect.requires_model_and_credential() {
            if self.model.as_deref().map_or(true, str::is_empty) {
                missing.push("model");
            }
            if !ApiCredential::is_available(self.api_key.as_deref(), &self.credential_env_var()) {
                missing.push("credential");
            }
        }
        missing
    }

    /// Whether this provider can be called at all.
    pub fn is_active(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Resolve the credential from config or environment.
    pub fn credential(&self) -> Option<ApiCredential> {
        ApiCredential::from_config_or_env(
            self.api_key.as_deref(),
            &self.credential_env_var(),
            self.name().to_string(),
        )
        .ok()
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("dialect", &self.dialect)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Configuration of the consensus orchestrator.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusConfig {
    /// Master switch; disabled yields the synthetic-consensus path
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Scores below this flag the case for human review
    #[serde(default = "default_hitl_threshold")]
    pub hitl_threshold: f64,

    /// Retries per provider after the initial attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-attempt timeout; a timed-out attempt counts toward the retry budget
    #[serde(default = "default_call_timeout", with = "humantime_duration")]
    pub call_timeout: Duration,

    /// Verdict-cache TTL; absent disables caching
    #[serde(default, with = "opt_humantime_duration")]
    pub cache_ttl: Option<Duration>,

    /// Configured reasoning providers
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

fn default_enabled() -> bool {
    true
}

fn default_hitl_threshold() -> f64 {
    0.75
}

fn default_max_retries() -> u32 {
    3
}

fn default_call_timeout() -> Duration {
    Duration::from_secs(15)
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            hitl_threshold: default_hitl_threshold(),
            max_retries: default_max_retries(),
            call_timeout: default_call_timeout(),
            cache_ttl: None,
            providers: Vec::new(),
        }
    }
}

impl ConsensusConfig {
    /// Parse a YAML configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML configuration from disk.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Providers whose required fields are all present.
    pub fn active_providers(&self) -> Vec<ProviderConfig> {
        self.providers
            .iter()
            .filter(|p| p.is_active())
            .cloned()
            .collect()
    }
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

mod opt_humantime_duration {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = Option::<String>::deserialize(deserializer)?;
        text.map(|t| humantime::parse_duration(&t).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_YAML: &str = r#"
hitl_threshold: 0.7
call_timeout: "20s"
providers:
  - id: "anthropic"
    dialect: anthropic
    endpoint: "https://api.anthropic.com/v1/messages"
    model: "claude-sonnet-4-5"
    api_key: "test-key"
  - id: "internal-referee"
    dialect: generic
    endpoint: "https://referee.internal/assess"
  - id: "openai"
    dialect: openai
    endpoint: "https://api.openai.com/v1/chat/completions"
    model: "gpt-4o"
"#;

    #[test]
    fn test_yaml_parsing_and_defaults() {
        let config = ConsensusConfig::from_yaml(CONFIG_YAML).unwrap();
        assert!(config.enabled);
        assert_eq!(config.hitl_threshold, 0.7);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.call_timeout, Duration::from_secs(20));
        assert_eq!(config.cache_ttl, None);
        assert_eq!(config.providers.len(), 3);
    }

    #[test]
    fn test_generic_provider_needs_only_endpoint() {
        let config = ConsensusConfig::from_yaml(CONFIG_YAML).unwrap();
        let generic = &config.providers[1];
        assert!(generic.is_active());
        assert!(generic.missing_fields().is_empty());
    }

    #[test]
    fn test_structured_provider_without_credential_is_inactive() {
        let config = ConsensusConfig::from_yaml(CONFIG_YAML).unwrap();
        // The openai entry has endpoint+model but no key (and no
        // OPENAI_API_KEY in the test environment is assumed); it must be
        // skipped, not fail.
        let openai = &config.providers[2];
        if std::env::var("OPENAI_API_KEY").is_err() {
            assert!(!openai.is_active());
            assert_eq!(openai.missing_fields(), vec!["credential"]);
        }
    }

    #[test]
    fn test_active_provider_filtering() {
        let config = ConsensusConfig::from_yaml(CONFIG_YAML).unwrap();
        let active = config.active_providers();
        assert!(active.iter().any(|p| p.id == "anthropic"));
        assert!(active.iter().any(|p| p.id == "internal-referee"));
    }

    #[test]
    fn test_credential_env_var_name() {
        let config = ConsensusConfig::from_yaml(CONFIG_YAML).unwrap();
        assert_eq!(
            config.providers[1].credential_env_var(),
            "INTERNAL_REFEREE_API_KEY"
        );
    }

    #[test]
    fn test_debug_never_prints_api_key() {
        let config = ConsensusConfig::from_yaml(CONFIG_YAML).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("test-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_empty_provider_list_is_valid() {
        let config = ConsensusConfig::from_yaml("enabled: true\n").unwrap();
        assert!(config.active_providers().is_empty());
    }
}
