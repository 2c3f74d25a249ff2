//! Change-of-tariff-classification alternative (CTH / CC / CTSH).
//!
//! A material satisfies the change when its classification differs from the
//! product's at the required prefix level. The alternative passes when at
//! least 80% of materials satisfy it.

use crate::hs;
use crate::types::{AlternativeEvaluation, HeadingChangeKind, OriginCalculationRequest};

/// Minimum share of materials that must change classification.
const CONFORMANCE_FLOOR: f64 = 0.80;

/// Confidence on pass: `0.85 + rate * 0.10`, so a full change scores 0.95.
const PASS_BASE: f64 = 0.85;
const PASS_RATE_WEIGHT: f64 = 0.10;

/// Confidence when the change requirement is not met.
const FAIL_CONFIDENCE: f64 = 0.30;

pub(super) fn evaluate(
    kind: HeadingChangeKind,
    request: &OriginCalculationRequest,
) -> AlternativeEvaluation {
    let total = request.materials.len();
    let changed = request
        .materials
        .iter()
        .filter(|m| classification_differs(kind, &m.hs_code, &request.hs_code))
        .count();

    // No materials: nothing fails the change requirement.
    let rate = if total == 0 {
        1.0
    } else {
        changed as f64 / total as f64
    };

    let result = rate >= CONFORMANCE_FLOOR;
    let confidence = if result {
        PASS_BASE + rate * PASS_RATE_WEIGHT
    } else {
        FAIL_CONFIDENCE
    };

    AlternativeEvaluation {
        result,
        confidence,
        details: format!(
            "{}/{} materials change {} ({:.2}% conformance)",
            changed,
            total,
            kind.label(),
            rate * 100.0
        ),
    }
}

fn classification_differs(kind: HeadingChangeKind, material: &str, product: &str) -> bool {
    match kind {
        HeadingChangeKind::Cth => hs::heading_differs(material, product),
        HeadingChangeKind::Cc => hs::chapter_differs(material, product),
        HeadingChangeKind::Ctsh => hs::subheading_differs(material, product),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Material;

    fn request(material_codes: &[&str]) -> OriginCalculationRequest {
        OriginCalculationRequest {
            product_sku: "SKU-1".to_string(),
            hs_code: "390110".to_string(),
            trade_agreement: "CETA".to_string(),
            materials: material_codes
                .iter()
                .map(|hs| Material {
                    hs_code: hs.to_string(),
                    origin: "CN".to_string(),
                    value: 100.0,
                    percentage: None,
                    description: None,
                })
                .collect(),
            product_value: 1000.0,
            manufacturing_processes: vec![],
        }
    }

    #[test]
    fn test_full_change_passes_at_095() {
        let eval = evaluate(HeadingChangeKind::Cth, &request(&["290110", "281000"]));
        assert!(eval.result);
        assert!((eval.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_partial_change_below_floor_fails_at_030() {
        // 1 of 2 materials changes heading: 50% < 80%
        let eval = evaluate(HeadingChangeKind::Cth, &request(&["290110", "390120"]));
        assert!(!eval.result);
        assert_eq!(eval.confidence, 0.30);
    }

    #[test]
    fn test_exact_floor_passes() {
        // 4 of 5 change heading: exactly 80%
        let eval = evaluate(
            HeadingChangeKind::Cth,
            &request(&["290110", "281000", "550190", "701010", "390120"]),
        );
        assert!(eval.result);
        assert!((eval.confidence - (0.85 + 0.8 * 0.10)).abs() < 1e-9);
    }

    #[test]
    fn test_chapter_level_is_stricter_than_heading() {
        // "391590" differs in heading but not in chapter
        let heading = evaluate(HeadingChangeKind::Cth, &request(&["391590"]));
        assert!(heading.result);

        let chapter = evaluate(HeadingChangeKind::Cc, &request(&["391590"]));
        assert!(!chapter.result);
    }

    #[test]
    fn test_subheading_level() {
        let eval = evaluate(HeadingChangeKind::Ctsh, &request(&["390120"]));
        assert!(eval.result);
    }

    #[test]
    fn test_no_materials_passes_vacuously() {
        let eval = evaluate(HeadingChangeKind::Cth, &request(&[]));
        assert!(eval.result);
        assert!((eval.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_details_render_two_decimal_conformance() {
        let eval = evaluate(HeadingChangeKind::Cth, &request(&["290110", "390120", "281000"]));
        assert!(eval.details.contains("66.67% conformance"), "{}", eval.details);
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use crate::types::Material;
    use proptest::prelude::*;

    proptest! {
        /// Pass confidence is monotone in the conformance rate and stays
        /// within [0.85, 0.95]; fail confidence is exactly 0.30.
        #[test]
        fn confidence_bounds(changed in 0usize..=20, unchanged in 0usize..=20) {
            let mut materials = Vec::new();
            for _ in 0..changed {
                materials.push(Material {
                    hs_code: "290110".to_string(),
                    origin: "CN".to_string(),
                    value: 1.0,
                    percentage: None,
                    description: None,
                });
            }
            for _ in 0..unchanged {
                materials.push(Material {
                    hs_code: "390110".to_string(),
                    origin: "CN".to_string(),
                    value: 1.0,
                    percentage: None,
                    description: None,
                });
            }
            let request = OriginCalculationRequest {
                product_sku: "SKU".to_string(),
                hs_code: "390110".to_string(),
                trade_agreement: "CETA".to_string(),
                materials,
                product_value: 1.0,
                manufacturing_processes: vec![],
            };

            let eval = evaluate(HeadingChangeKind::Cth, &request);
            if eval.result {
                prop_assert!(eval.confidence >= 0.85 && eval.confidence <= 0.95 + 1e-9);
            } else {
                prop_assert_eq!(eval.confidence, 0.30);
            }
        }
    }
}
