//! Global derived calculations.
//!
//! Recomputed from the full material list on every request, independent of
//! which rule won, so the audit layer always receives one consistent numeric
//! summary. Percentages are plain decimal numbers; explanations render them
//! with exactly two decimals.

use crate::agreements;
use crate::hs;
use crate::types::{DerivedCalculations, OriginCalculationRequest};

/// Compute the request-wide numeric summary.
pub fn derive(request: &OriginCalculationRequest) -> DerivedCalculations {
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

    let (rvc, max_nom) = if request.product_value > 0.0 {
        (
            originating / request.product_value * 100.0,
            non_originating / request.product_value * 100.0,
        )
    } else {
        (0.0, 0.0)
    };

    DerivedCalculations {
        rvc,
        max_nom,
        change_of_tariff: request
            .materials
            .iter()
            .all(|m| hs::heading_differs(&m.hs_code, &request.hs_code)),
        wholly_obtained: request
            .materials
            .iter()
            .all(|m| agreements::is_originating(&request.trade_agreement, &m.origin)),
    }
}

/// Render a percentage with two decimals, e.g. `65.00%`.
pub fn fmt_pct(value: f64) -> String {
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Material;

    fn material(hs: &str, origin: &str, value: f64) -> Material {
        Material {
            hs_code: hs.to_string(),
            origin: origin.to_string(),
            value,
            percentage: None,
            description: None,
        }
    }

    fn request(materials: Vec<Material>, product_value: f64) -> OriginCalculationRequest {
        OriginCalculationRequest {
            product_sku: "SKU-1".to_string(),
            hs_code: "390110".to_string(),
            trade_agreement: "CETA".to_string(),
            materials,
            product_value,
            manufacturing_processes: vec![],
        }
    }

    #[test]
    fn test_rvc_and_max_nom_shares() {
        let calc = derive(&request(
            vec![material("290110", "DE", 650.0), material("281000", "CN", 200.0)],
            1000.0,
        ));
        assert!((calc.rvc - 65.0).abs() < 1e-9);
        assert!((calc.max_nom - 20.0).abs() < 1e-9);
        assert!(calc.change_of_tariff);
        assert!(!calc.wholly_obtained);
    }

    #[test]
    fn test_wholly_obtained_flag() {
        let calc = derive(&request(vec![material("290110", "CA", 100.0)], 1000.0));
        assert!(calc.wholly_obtained);
    }

    #[test]
    fn test_change_of_tariff_false_when_heading_shared() {
        let calc = derive(&request(vec![material("390120", "DE", 100.0)], 1000.0));
        assert!(!calc.change_of_tariff);
    }

    #[test]
    fn test_zero_product_value_renders_zero_shares() {
        let calc = derive(&request(vec![material("290110", "CN", 100.0)], 0.0));
        assert_eq!(calc.rvc, 0.0);
        assert_eq!(calc.max_nom, 0.0);
    }

    #[test]
    fn test_pct_rendering() {
        assert_eq!(fmt_pct(65.0), "65.00%");
        assert_eq!(fmt_pct(33.333), "33.33%");
    }
}
