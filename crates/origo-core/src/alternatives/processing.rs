//! Required-processing alternative.
//!
//! Passes when every required process label appears in the request's
//! manufacturing processes. Matching is exact and case-sensitive: the labels
//! are catalog-controlled vocabulary, not free text to be fuzzy-matched.

use crate::types::{AlternativeEvaluation, OriginCalculationRequest};

const PASS_CONFIDENCE: f64 = 0.80;
const FAIL_CONFIDENCE: f64 = 0.10;

pub(super) fn evaluate(
    required_processes: &[String],
    request: &OriginCalculationRequest,
) -> AlternativeEvaluation {
    let missing: Vec<&str> = required_processes
        .iter()
        .filter(|required| !request.manufacturing_processes.contains(required))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        AlternativeEvaluation {
            result: true,
            confidence: PASS_CONFIDENCE,
            details: format!(
                "all {} required manufacturing processes declared",
                required_processes.len()
            ),
        }
    } else {
        AlternativeEvaluation {
            result: false,
            confidence: FAIL_CONFIDENCE,
            details: format!("missing required processes: {}", missing.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(processes: &[&str]) -> OriginCalculationRequest {
        OriginCalculationRequest {
            product_sku: "SKU-1".to_string(),
            hs_code: "390110".to_string(),
            trade_agreement: "CETA".to_string(),
            materials: vec![],
            product_value: 1000.0,
            manufacturing_processes: processes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_all_processes_present() {
        let eval = evaluate(
            &["polymerisation".to_string()],
            &request(&["polymerisation", "extrusion"]),
        );
        assert!(eval.result);
        assert_eq!(eval.confidence, 0.80);
    }

    #[test]
    fn test_missing_process_fails() {
        let eval = evaluate(
            &["polymerisation".to_string(), "refining".to_string()],
            &request(&["polymerisation"]),
        );
        assert!(!eval.result);
        assert_eq!(eval.confidence, 0.10);
        assert!(eval.details.contains("refining"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let eval = evaluate(&["Polymerisation".to_string()], &request(&["polymerisation"]));
        assert!(!eval.result);
    }

    #[test]
    fn test_empty_requirement_passes() {
        let eval = evaluate(&[], &request(&[]));
        assert!(eval.result);
    }
}
