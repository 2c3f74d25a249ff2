//! In-memory rule catalog loadable from YAML or JSON documents.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{schema::validate_rule_document, CatalogError, RuleCatalog};
use crate::types::OriginRule;

/// Top-level shape of a catalog document.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    rules: Vec<serde_json::Value>,
}

/// An in-memory catalog keyed by `(hs_code, trade_agreement)`.
///
/// Every rule document is schema-validated before deserialization. Lookups
/// compare codes case-insensitively on the agreement side; HS codes match
/// exactly (they are opaque strings).
#[derive(Debug, Default)]
pub struct StaticCatalog {
    rules: BTreeMap<(String, String), Vec<OriginRule>>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from already-parsed rules, without schema validation.
    pub fn from_rules(rules: impl IntoIterator<Item = OriginRule>) -> Self {
        let mut catalog = Self::new();
        for rule in rules {
            catalog.insert(rule);
        }
        catalog
    }

    /// Parse a YAML catalog document (`rules: [...]`), validating each rule.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_yaml::from_str(yaml)?;
        Self::from_documents(doc.rules)
    }

    /// Load a YAML catalog document from disk.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    fn from_documents(documents: Vec<serde_json::Value>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for doc in documents {
            validate_rule_document(&doc)?;
            let rule: OriginRule = serde_json::from_value(doc)?;
            catalog.insert(rule);
        }
        Ok(catalog)
    }

    /// Add one rule.
    pub fn insert(&mut self, rule: OriginRule) {
        let key = (
            rule.hs_code.clone(),
            rule.trade_agreement.trim().to_ascii_uppercase(),
        );
        self.rules.entry(key).or_default().push(rule);
    }

    /// Number of rules held, across all keys.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// True when the catalog holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleCatalog for StaticCatalog {
    fn rules_for(
        &self,
        hs_code: &str,
        trade_agreement: &str,
    ) -> Result<Vec<OriginRule>, CatalogError> {
        let key = (
            hs_code.to_string(),
            trade_agreement.trim().to_ascii_uppercase(),
        );
        Ok(self.rules.get(&key).cloned().unwrap_or_default())
    }
}
