//! Alternative qualification-path evaluators.
//!
//! Each origin rule lists zero or more alternatives; a rule qualifies when
//! any one of them passes. Every evaluator is a pure function of the request
//! and returns an [`AlternativeEvaluation`] — a failed path is a normal
//! value, never an error, so one bad alternative can never abort a request.

mod heading_change;
mod processing;
mod text_fallback;
mod value_content;

pub use text_fallback::evaluate_rule_text;

use crate::types::{Alternative, AlternativeEvaluation, OriginCalculationRequest};

/// Evaluate one alternative against the request.
pub fn evaluate_alternative(
    alternative: &Alternative,
    request: &OriginCalculationRequest,
) -> AlternativeEvaluation {
    match alternative {
        Alternative::HeadingChange { change } => heading_change::evaluate(*change, request),
        Alternative::ValueRule { method, threshold } => {
            value_content::evaluate(*method, *threshold, request)
        }
        Alternative::ProcessingRule { required_processes } => {
            processing::evaluate(required_processes, request)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HeadingChangeKind, Material, ValueMethod};

    fn request(materials: Vec<Material>) -> OriginCalculationRequest {
        OriginCalculationRequest {
            product_sku: "SKU-1".to_string(),
            hs_code: "390110".to_string(),
            trade_agreement: "CETA".to_string(),
            materials,
            product_value: 1000.0,
            manufacturing_processes: vec![],
        }
    }

    fn material(hs: &str, origin: &str, value: f64) -> Material {
        Material {
            hs_code: hs.to_string(),
            origin: origin.to_string(),
            value,
            percentage: None,
            description: None,
        }
    }

    #[test]
    fn test_dispatch_covers_every_variant() {
        let req = request(vec![material("290110", "CN", 400.0)]);

        let heading = evaluate_alternative(
            &Alternative::HeadingChange {
                change: HeadingChangeKind::Cth,
            },
            &req,
        );
        assert!(heading.result);

        let value = evaluate_alternative(
            &Alternative::ValueRule {
                method: ValueMethod::MaxNom,
                threshold: 50.0,
            },
            &req,
        );
        assert!(value.result);

        let processing = evaluate_alternative(
            &Alternative::ProcessingRule {
                required_processes: vec!["polymerisation".to_string()],
            },
            &req,
        );
        assert!(!processing.result);
    }
}
