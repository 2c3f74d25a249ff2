//! Case summary and provider prompt.
//!
//! One natural-language summary per calculation, shared verbatim by every
//! provider. The instruction block is constant so dialects with prompt
//! caching pay for the case block only.

use origo_core::{
    calculations, OriginCalculationRequest, OriginCalculationResult, RuleEvaluation,
};

/// Instruction block sent ahead of every case.
///
/// The framing keeps providers corroborating a deterministic determination
/// rather than re-deciding the case from scratch.
pub const CASE_INSTRUCTION: &str = r#"
You are an independent customs-origin referee corroborating a preferential-origin determination.

You are given one case: the product, its bill of materials, the trade agreement, the origin rules that were evaluated and the engine's current decision. Assess whether the decision is defensible under the cited rules.

Respond with a single JSON object:
{
  "decision": "conform" | "non-conform" | "inconclusive",
  "confidence": 0.0-1.0,
  "rationale": "one short paragraph citing the decisive rule or figure"
}

Use "inconclusive" when the case cannot be assessed from the information given. Do not invent rules or tariff data.
"#;

/// Render the case block: product, materials, rule evaluations, decision.
pub fn build_case_summary(
    request: &OriginCalculationRequest,
    evaluations: &[RuleEvaluation],
    engine_result: &OriginCalculationResult,
) -> String {
    let mut summary = String::new();

    summary.push_str(&format!(
        "Product {} (HS {}) under {}, value {:.2}.\n",
        request.product_sku, request.hs_code, request.trade_agreement, request.product_value
    ));

    if request.materials.is_empty() {
        summary.push_str("Bill of materials: none declared.\n");
    } else {
        summary.push_str("Bill of materials:\n");
        for material in &request.materials {
            let share = if request.product_value > 0.0 {
                material.value / request.product_value * 100.0
            } else {
                0.0
            };
            summary.push_str(&format!(
                "- HS {} from {}: value {:.2} ({} of product value)\n",
                material.hs_code,
                material.origin,
                material.value,
                calculations::fmt_pct(share)
            ));
        }
    }

    if !request.manufacturing_processes.is_empty() {
        summary.push_str(&format!(
            "Declared processes: {}.\n",
            request.manufacturing_processes.join(", ")
        ));
    }

    if evaluations.is_empty() {
        summary.push_str("Rule evaluations: no applicable rules.\n");
    } else {
        summary.push_str("Rule evaluations:\n");
        for evaluation in evaluations {
            summary.push_str(&format!(
                "- {} (priority {}): {} at confidence {:.2} — {}\n",
                evaluation.rule.id,
                evaluation.rule.effective_priority(),
                if evaluation.is_conform {
                    "conform"
                } else {
                    "non-conform"
                },
                evaluation.confidence,
                evaluation.explanation
            ));
        }
    }

    summary.push_str(&format!(
        "Engine decision: {} at confidence {:.2}.",
        if engine_result.is_conform {
            "CONFORM"
        } else {
            "NON-CONFORM"
        },
        engine_result.confidence
    ));

    summary
}

/// Full prompt: instruction block plus case block.
pub fn build_prompt(
    request: &OriginCalculationRequest,
    evaluations: &[RuleEvaluation],
    engine_result: &OriginCalculationResult,
) -> String {
    format!(
        "{}\n\n{}",
        CASE_INSTRUCTION.trim(),
        build_case_summary(request, evaluations, engine_result)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use origo_core::{Material, OriginEngine, StaticCatalog};
    use std::sync::Arc;

    fn case() -> (
        OriginCalculationRequest,
        Vec<RuleEvaluation>,
        OriginCalculationResult,
    ) {
        let request = OriginCalculationRequest {
            product_sku: "POLY-1".to_string(),
            hs_code: "390110".to_string(),
            trade_agreement: "CETA".to_string(),
            materials: vec![Material {
                hs_code: "290110".to_string(),
                origin: "DE".to_string(),
                value: 650.0,
                percentage: None,
                description: None,
            }],
            product_value: 1000.0,
            manufacturing_processes: vec!["polymerisation".to_string()],
        };
        let engine = OriginEngine::new(Arc::new(StaticCatalog::new()));
        let (result, evaluations) = engine.calculate_with_evaluations(&request);
        (request, evaluations, result)
    }

    #[test]
    fn test_summary_carries_the_whole_case() {
        let (request, evaluations, result) = case();
        let summary = build_case_summary(&request, &evaluations, &result);

        assert!(summary.contains("POLY-1"));
        assert!(summary.contains("HS 390110"));
        assert!(summary.contains("CETA"));
        assert!(summary.contains("65.00% of product value"));
        assert!(summary.contains("polymerisation"));
        assert!(summary.contains("no applicable rules"));
        assert!(summary.contains("Engine decision: NON-CONFORM"));
    }

    #[test]
    fn test_prompt_leads_with_the_instruction() {
        let (request, evaluations, result) = case();
        let prompt = build_prompt(&request, &evaluations, &result);

        assert!(prompt.starts_with("You are an independent customs-origin referee"));
        assert!(prompt.contains("\"decision\""));
        assert!(prompt.ends_with("at confidence 0.00."));
    }
}
