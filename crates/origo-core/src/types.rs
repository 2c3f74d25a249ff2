//! Core data model for origin determinations.
//!
//! Requests, rules and results are plain serde values. A calculation is
//! stateless: one request in, one result out, nothing retained between calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One bill-of-materials line.
///
/// Immutable once submitted in a request. `hs_code` is the material's own
/// 6-digit tariff classification; `origin` is a country or region code;
/// `value` is expressed in the product's currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Material {
    /// 6-digit tariff classification of the material
    pub hs_code: String,

    /// Country/region of origin (e.g. "DE", "CA", "CN", "EU")
    pub origin: String,

    /// Monetary value in the product's currency
    pub value: f64,

    /// Share of product value; may be re-derived from `value`
    #[serde(default)]
    pub percentage: Option<f64>,

    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
}

/// One origin calculation request.
///
/// Stateless; the SKU is carried only for audit correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginCalculationRequest {
    /// Product SKU, used for audit correlation
    pub product_sku: String,

    /// HS code of the finished product
    pub hs_code: String,

    /// Trade agreement code (e.g. "CETA")
    pub trade_agreement: String,

    /// Bill of materials, in submission order
    pub materials: Vec<Material>,

    /// Total product value (ex-works)
    pub product_value: f64,

    /// Free-text manufacturing process labels
    #[serde(default)]
    pub manufacturing_processes: Vec<String>,
}

/// Required level of tariff classification change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HeadingChangeKind {
    /// Change of Tariff Heading (4-digit)
    #[serde(rename = "CTH")]
    Cth,

    /// Change of Chapter (2-digit)
    #[serde(rename = "CC")]
    Cc,

    /// Change of Tariff Sub-Heading (6-digit)
    #[serde(rename = "CTSH")]
    Ctsh,
}

impl HeadingChangeKind {
    /// Human-readable label used in evaluation details.
    pub fn label(&self) -> &'static str {
        match self {
            HeadingChangeKind::Cth => "tariff heading",
            HeadingChangeKind::Cc => "chapter",
            HeadingChangeKind::Ctsh => "tariff sub-heading",
        }
    }
}

/// Value-content calculation method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValueMethod {
    /// Maximum allowed non-originating materials, as % of product value
    #[serde(rename = "MaxNOM")]
    MaxNom,

    /// Regional Value Content: originating value as % of product value
    #[serde(rename = "RVC")]
    Rvc,
}

/// One qualification path inside an origin rule.
///
/// A rule qualifies when any one of its alternatives passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Alternative {
    /// Tariff classification of every material must shift at the given level
    HeadingChange { change: HeadingChangeKind },

    /// Value-content threshold, inclusive on the boundary
    ValueRule { method: ValueMethod, threshold: f64 },

    /// Every listed process must appear in the request, exact match
    ProcessingRule { required_processes: Vec<String> },
}

/// Structured payload of an origin rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleConditions {
    /// Zero or more qualification paths
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

/// One origin rule from the catalog.
///
/// Rules are read-only inputs; they are versioned and owned by the rule
/// catalog, never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OriginRule {
    /// Catalog identifier
    pub id: String,

    /// HS code the rule applies to
    pub hs_code: String,

    /// Trade agreement the rule belongs to
    pub trade_agreement: String,

    /// Human-readable citation of the legal text
    pub rule_text: String,

    /// Evaluation order; lower evaluates first, missing sorts last
    #[serde(default)]
    pub priority: Option<u32>,

    /// Structured qualification paths
    #[serde(default)]
    pub conditions: RuleConditions,
}

impl OriginRule {
    /// Effective priority used for ordering; rules without one sort last.
    pub fn effective_priority(&self) -> u32 {
        self.priority.unwrap_or(999)
    }
}

/// Outcome of evaluating a single alternative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlternativeEvaluation {
    /// Whether the alternative qualifies the product
    pub result: bool,

    /// Confidence in the assessment, 0..1
    pub confidence: f64,

    /// Human-readable account of the comparison
    pub details: String,
}

/// Outcome of evaluating one rule against a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEvaluation {
    /// The rule that was evaluated
    pub rule: OriginRule,

    /// Whether any qualification path passed
    pub is_conform: bool,

    /// Confidence of the winning path, or 0.0 when none qualified
    pub confidence: f64,

    /// Human-readable account of the rule outcome
    pub explanation: String,

    /// Every alternative evaluation, in rule order (legacy fallback last)
    pub alternatives: Vec<AlternativeEvaluation>,
}

/// Numeric summary derived from the full material list.
///
/// Computed globally, independent of which rule won, so the audit layer
/// always sees a consistent picture.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DerivedCalculations {
    /// Regional Value Content as a percentage of product value
    pub rvc: f64,

    /// Non-originating materials as a percentage of product value
    pub max_nom: f64,

    /// True when every material's tariff heading differs from the product's
    pub change_of_tariff: bool,

    /// True when every material originates under the agreement
    pub wholly_obtained: bool,
}

/// One reasoning provider's contribution to a consensus run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderCallResult {
    /// Provider replied and the reply normalized cleanly
    Ok {
        provider_id: String,
        decision: Decision,
        confidence: f64,
        rationale: String,
        latency_ms: u64,
    },

    /// Provider was never called (missing credentials, model or endpoint)
    Skipped { provider_id: String, reason: String },

    /// Provider failed after the retry budget was exhausted
    Error { provider_id: String, message: String },
}

impl ProviderCallResult {
    /// Provider this outcome belongs to.
    pub fn provider_id(&self) -> &str {
        match self {
            ProviderCallResult::Ok { provider_id, .. }
            | ProviderCallResult::Skipped { provider_id, .. }
            | ProviderCallResult::Error { provider_id, .. } => provider_id,
        }
    }

    /// True for the `Ok` variant.
    pub fn is_success(&self) -> bool {
        matches!(self, ProviderCallResult::Ok { .. })
    }
}

/// A provider's vote on the case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    Conform,
    NonConform,
    Inconclusive,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Conform => write!(f, "conform"),
            Decision::NonConform => write!(f, "non-conform"),
            Decision::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// Audit snapshot of one consensus run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusAuditTrail {
    /// Final consensus score
    pub consensus_score: f64,

    /// HITL threshold in force when the run was scored
    pub required_threshold: f64,

    /// Every provider outcome, including skips and errors
    pub provider_decisions: Vec<ProviderCallResult>,

    /// When the consensus was computed
    pub generated_at: DateTime<Utc>,
}

/// The result of one origin calculation.
///
/// Created fresh per request; never persisted by the engine. The consensus
/// fields are empty until the runtime's orchestrator enriches the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginCalculationResult {
    /// Whether the product qualifies for preferential treatment
    pub is_conform: bool,

    /// Confidence in the determination, 0..1
    pub confidence: f64,

    /// Human-readable account of the determination
    pub explanation: String,

    /// Rules that were applicable and evaluated, in priority order
    pub applied_rules: Vec<OriginRule>,

    /// Global numeric summary from the full material list
    pub calculations: DerivedCalculations,

    /// Alternative evaluations of the winning rule
    pub alternatives: Vec<AlternativeEvaluation>,

    /// Consensus narrative, set by the consensus runtime
    #[serde(default)]
    pub consensus_summary: Option<String>,

    /// Aggregate provider confidence, set by the consensus runtime
    #[serde(default)]
    pub consensus_score: Option<f64>,

    /// Rationales of providers that disagreed with the consensus
    #[serde(default)]
    pub dissenting_opinions: Vec<String>,

    /// Whether a human must review this case
    #[serde(default)]
    pub human_review_required: bool,

    /// Per-provider outcomes of the consensus run
    #[serde(default)]
    pub provider_decisions: Vec<ProviderCallResult>,

    /// Audit snapshot of the consensus run
    #[serde(default)]
    pub audit_trail: Option<ConsensusAuditTrail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternative_yaml_round_trip() {
        let yaml = r#"
type: value_rule
method: RVC
threshold: 40
"#;
        let alt: Alternative = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            alt,
            Alternative::ValueRule {
                method: ValueMethod::Rvc,
                threshold: 40.0
            }
        );
    }

    #[test]
    fn test_heading_change_tags() {
        let alt: Alternative =
            serde_yaml::from_str("type: heading_change\nchange: CTSH\n").unwrap();
        assert_eq!(
            alt,
            Alternative::HeadingChange {
                change: HeadingChangeKind::Ctsh
            }
        );
    }

    #[test]
    fn test_rule_without_priority_sorts_last() {
        let rule: OriginRule = serde_yaml::from_str(
            r#"
id: "R-1"
hs_code: "390110"
trade_agreement: "CETA"
rule_text: "CTH or MaxNOM 50%"
"#,
        )
        .unwrap();
        assert_eq!(rule.effective_priority(), 999);
        assert!(rule.conditions.alternatives.is_empty());
    }

    #[test]
    fn test_decision_rendering() {
        assert_eq!(Decision::NonConform.to_string(), "non-conform");
        let json = serde_json::to_string(&Decision::NonConform).unwrap();
        assert_eq!(json, "\"non-conform\"");
    }
}
