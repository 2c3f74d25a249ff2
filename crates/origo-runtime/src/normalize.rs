//! Reply normalization.
//!
//! Every provider reply, structured or free text, collapses into one vote
//! shape before it reaches the orchestrator. Structured fields win when
//! present; free text is decided by substring, testing "non-conform" before
//! "conform" so a negative verdict is never miscategorized as positive.

use origo_core::Decision;
use serde_json::Value;

/// A provider reply in the common vote shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedVote {
    pub decision: Decision,
    pub confidence: f64,
    pub rationale: String,
}

/// Clamp a confidence into `[floor, 1]`; non-finite values collapse to the
/// floor.
pub fn clamp_confidence(value: f64, floor: f64) -> f64 {
    if value.is_finite() {
        value.clamp(floor, 1.0)
    } else {
        floor
    }
}

/// Derive a decision from free text. "non-conform" is tested first.
pub fn parse_decision(text: &str) -> Decision {
    let lower = text.to_lowercase();
    if lower.contains("non-conform") {
        Decision::NonConform
    } else if lower.contains("conform") {
        Decision::Conform
    } else {
        Decision::Inconclusive
    }
}

/// Normalize one reply text into a vote.
///
/// A JSON object reply is read through its `decision`/`confidence`/
/// `rationale` fields (with the aliases simple services use); anything else
/// is treated as free text with the minimum-floor confidence.
pub fn normalize_reply(text: &str, floor: f64) -> NormalizedVote {
    let stripped = strip_code_fences(text);

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(stripped) {
        let decision = map
            .get("decision")
            .or_else(|| map.get("verdict"))
            .and_then(Value::as_str)
            .map(parse_decision)
            .unwrap_or_else(|| parse_decision(stripped));

        let confidence = map
            .get("confidence")
            .and_then(Value::as_f64)
            .map(|c| clamp_confidence(c, floor))
            .unwrap_or(floor);

        let rationale = map
            .get("rationale")
            .or_else(|| map.get("reasoning"))
            .or_else(|| map.get("explanation"))
            .and_then(Value::as_str)
            .unwrap_or(stripped)
            .trim()
            .to_string();

        return NormalizedVote {
            decision,
            confidence,
            rationale,
        };
    }

    NormalizedVote {
        decision: parse_decision(stripped),
        confidence: floor,
        rationale: stripped.trim().to_string(),
    }
}

/// Strip a single surrounding markdown code fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}


#[cfg(test)]
mod properties {
    use super::*;
    use crate::config::MIN_CONSENSUS_SCORE;
    use proptest::prelude::*;

    proptest! {
        /// Normalized confidence always lands inside [floor, 1].
        #[test]
        fn confidence_always_in_bounds(raw in proptest::num::f64::ANY) {
            let text = format!("{{\"decision\": \"conform\", \"confidence\": {}}}", raw);
            let vote = normalize_reply(&text, MIN_CONSENSUS_SCORE);
            prop_assert!(vote.confidence >= MIN_CONSENSUS_SCORE);
            prop_assert!(vote.confidence <= 1.0);
        }
    }
}
