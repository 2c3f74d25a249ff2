//! Secure credential handling for reasoning providers.
//!
//! Provider API keys pass through configuration files and environment
//! variables on their way into HTTP headers. This wrapper makes the journey
//! safe:
//!
//! - **No accidental logging**: credentials never appear in Debug output
//! - **Memory safety**: values are zeroed on drop via the `secrecy` crate
//! - **Explicit exposure**: the raw value is only reachable through
//!   [`ApiCredential::expose`], at the point the header is built

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Where a credential was loaded from.
///
/// Useful when debugging provider configuration without exposing the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from the provider descriptor
    Config,
    /// Loaded from an environment variable
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
        }
    }
}

/// A securely-stored provider credential.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: String,
}

impl ApiCredential {
    /// Wrap a raw value. After this point it cannot be logged accidentally.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: impl Into<String>) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name: name.into(),
        }
    }

    /// Load from the provider descriptor, falling back to an environment
    /// variable. `Err` carries the names consulted, never a value.
    pub fn from_config_or_env(
        config_value: Option<&str>,
        env_var: &str,
        name: impl Into<String>,
    ) -> Result<Self, String> {
        if let Some(value) = config_value {
            if !value.is_empty() {
                return Ok(Self::new(value, CredentialSource::Config, name));
            }
        }

        if let Ok(value) = std::env::var(env_var) {
            if !value.is_empty() {
                return Ok(Self::new(value, CredentialSource::Environment, name));
            }
        }

        Err(format!(
            "{} unavailable: set it in the provider descriptor or via {}",
            name.into(),
            env_var
        ))
    }

    /// Whether a credential could be resolved, without resolving it.
    pub fn is_available(config_value: Option<&str>, env_var: &str) -> bool {
        config_value.is_some_and(|v| !v.is_empty())
            || std::env::var(env_var).is_ok_and(|v| !v.is_empty())
    }

    /// Expose the raw value for use in an HTTP header.
    ///
    /// Only call this at the point of use; never store the exposed value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// True for a blank credential.
    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    /// Where this credential came from.
    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let cred = ApiCredential::new("sk-super-secret", CredentialSource::Config, "test key");
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("sk-super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_returns_raw_value() {
        let cred = ApiCredential::new("sk-super-secret", CredentialSource::Config, "test key");
        assert_eq!(cred.expose(), "sk-super-secret");
        assert!(!cred.is_empty());
    }

    #[test]
    fn test_config_value_wins_over_environment() {
        let cred = ApiCredential::from_config_or_env(
            Some("from-config"),
            "ORIGO_TEST_NO_SUCH_VAR",
            "test key",
        )
        .unwrap();
        assert_eq!(cred.expose(), "from-config");
        assert_eq!(cred.source(), CredentialSource::Config);
    }

    #[test]
    fn test_missing_everywhere_is_an_error_without_leaking() {
        let err = ApiCredential::from_config_or_env(None, "ORIGO_TEST_NO_SUCH_VAR", "test key")
            .unwrap_err();
        assert!(err.contains("ORIGO_TEST_NO_SUCH_VAR"));
    }

    #[test]
    fn test_empty_config_value_counts_as_absent() {
        assert!(!ApiCredential::is_available(Some(""), "ORIGO_TEST_NO_SUCH_VAR"));
    }
}
