//! # origo-core
//!
//! Deterministic preferential-origin rule evaluation engine.
//!
//! Given a product, its bill of materials and a trade agreement, this crate
//! answers: does the product qualify for preferential tariff treatment, and
//! with what confidence?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same request against an unchanged catalog always
//!    produces the same result
//! 2. **No network calls**: All evaluation is rule-based; the AI consensus
//!    layer lives in `origo-runtime`
//! 3. **Total**: Business non-outcomes (no rules, nothing qualifies) are
//!    values, not errors; catalog failure degrades to the no-rules result
//! 4. **Traceable**: Every result cites the rules applied and the
//!    alternative evaluations behind the verdict
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use origo_core::{OriginEngine, StaticCatalog};
//!
//! let catalog = StaticCatalog::from_yaml_file("rules.yaml")?;
//! let engine = OriginEngine::new(Arc::new(catalog));
//! let result = engine.calculate(&request);
//!
//! if result.is_conform {
//!     println!("qualifies at confidence {:.2}", result.confidence);
//! }
//! ```

pub mod agreements;
pub mod alternatives;
pub mod calculations;
pub mod catalog;
pub mod engine;
pub mod hs;
pub mod selection;
pub mod types;

// Re-export main types at crate root
pub use catalog::{CatalogError, RuleCatalog, StaticCatalog};
pub use engine::OriginEngine;
pub use types::{
    Alternative, AlternativeEvaluation, ConsensusAuditTrail, Decision, DerivedCalculations,
    HeadingChangeKind, Material, OriginCalculationRequest, OriginCalculationResult, OriginRule,
    ProviderCallResult, RuleConditions, RuleEvaluation, ValueMethod,
};
