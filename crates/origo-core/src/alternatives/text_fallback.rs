//! Legacy free-text rule fallback.
//!
//! Older catalog entries predate the structured `conditions` payload and
//! carry their semantics only in the citation text. When no structured
//! alternative passes, the engine scans the rule text for the two phrases
//! the legacy catalog used and evaluates the corresponding check.

use lazy_static::lazy_static;
use regex::Regex;

use crate::agreements;
use crate::hs;
use crate::types::{AlternativeEvaluation, OriginCalculationRequest};

/// Confidence of the wholly-obtained legacy check.
const WHOLLY_OBTAINED_CONFIDENCE: f64 = 0.95;

/// Confidence of the change-of-chapter legacy check.
const CHANGE_OF_CHAPTER_CONFIDENCE: f64 = 0.75;

lazy_static! {
    static ref WHOLLY_OBTAINED: Regex = Regex::new(r"(?i)wholly\s+obtained").unwrap();
    static ref CHANGE_OF_CHAPTER: Regex = Regex::new(r"(?i)change\s+of\s+chapter").unwrap();
}

/// Scan the citation text and evaluate the matching legacy check, if any.
///
/// "wholly obtained" is tested first; an unmatched text returns `None` and
/// the rule fails with zero confidence. The confidence describes the
/// assessment, not the outcome, so a matched check that does not hold still
/// reports at the pattern's confidence.
pub fn evaluate_rule_text(
    rule_text: &str,
    request: &OriginCalculationRequest,
) -> Option<AlternativeEvaluation> {
    if WHOLLY_OBTAINED.is_match(rule_text) {
        let result = request
            .materials
            .iter()
            .all(|m| agreements::is_originating(&request.trade_agreement, &m.origin));
        return Some(AlternativeEvaluation {
            result,
            confidence: WHOLLY_OBTAINED_CONFIDENCE,
            details: if result {
                "legacy text rule: every material originates within the agreement".to_string()
            } else {
                "legacy text rule: non-originating materials present, product is not wholly obtained"
                    .to_string()
            },
        });
    }

    if CHANGE_OF_CHAPTER.is_match(rule_text) {
        let result = request
            .materials
            .iter()
            .all(|m| hs::chapter_differs(&m.hs_code, &request.hs_code));
        return Some(AlternativeEvaluation {
            result,
            confidence: CHANGE_OF_CHAPTER_CONFIDENCE,
            details: if result {
                "legacy text rule: every material sits outside the product chapter".to_string()
            } else {
                "legacy text rule: at least one material shares the product chapter".to_string()
            },
        });
    }

    None
}
