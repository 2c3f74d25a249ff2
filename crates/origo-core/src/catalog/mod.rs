//! Rule catalog access.
//!
//! The catalog that maps `(hs_code, trade_agreement)` to an ordered rule list
//! is an external collaborator; the engine only needs the lookup contract in
//! [`RuleCatalog`]. [`StaticCatalog`] is the in-memory implementation used by
//! tests, the CLI and embedders that load rule documents from YAML or JSON.

mod schema;
mod store;

pub use schema::validate_rule_document;
pub use store::StaticCatalog;

use thiserror::Error;

use crate::types::OriginRule;

/// Errors from catalog access and loading.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Rule document rejected by schema: {0}")]
    SchemaViolation(String),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Lookup contract the engine depends on.
///
/// Implementations must tolerate unknown `(hs_code, trade_agreement)` pairs
/// by returning an empty list; an `Err` is reserved for infrastructure
/// failure and degrades to the "no applicable rules" outcome in the engine.
pub trait RuleCatalog: Send + Sync {
    /// Rules applicable to the product classification under the agreement.
    ///
    /// The returned list need not be sorted; the engine orders by priority.
    fn rules_for(
        &self,
        hs_code: &str,
        trade_agreement: &str,
    ) -> Result<Vec<OriginRule>, CatalogError>;
}
