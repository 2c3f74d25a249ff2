//! Value-content alternative (MaxNOM / RVC).
//!
//! Both methods compare a material-value share of the product value against
//! the rule's threshold. Comparisons are boundary-inclusive: a share exactly
//! on the threshold passes.

use crate::agreements;
use crate::types::{AlternativeEvaluation, OriginCalculationRequest, ValueMethod};

const PASS_CONFIDENCE: f64 = 0.90;
const FAIL_CONFIDENCE: f64 = 0.20;

pub(super) fn evaluate(
    method: ValueMethod,
    threshold: f64,
    request: &OriginCalculationRequest,
) -> AlternativeEvaluation {
    if request.product_value <= 0.0 {
        return AlternativeEvaluation {
            result: false,
            confidence: 0.0,
            details: "product value must be positive for a value-content calculation".to_string(),
        };
    }

    let originating: f64 = request
        .materials
        .iter()
        .filter(|m| agreements::is_originating(&request.trade_agreement, &m.origin))
        .map(|m| m.value)
        .sum();
    let non_originating: f64 = request
        .materials
        .iter()
        .filter(|m| !agreements::is_originating(&request.trade_agreement, &m.origin))
        .map(|m| m.value)
        .sum();

    match method {
        ValueMethod::MaxNom => {
            let share = non_originating / request.product_value * 100.0;
            let result = share <= threshold;
            AlternativeEvaluation {
                result,
                confidence: if result { PASS_CONFIDENCE } else { FAIL_CONFIDENCE },
                details: format!(
                    "non-originating materials {:.2}% of product value (MaxNOM limit {:.2}%)",
                    share, threshold
                ),
            }
        }
        ValueMethod::Rvc => {
            let share = originating / request.product_value * 100.0;
            let result = share >= threshold;
            AlternativeEvaluation {
                result,
                confidence: if result { PASS_CONFIDENCE } else { FAIL_CONFIDENCE },
                details: format!(
                    "regional value content {:.2}% of product value (RVC threshold {:.2}%)",
                    share, threshold
                ),
            }
        }
    }
}
