//! Best-result selection across rule evaluations.
//!
//! Selection is a pure function, kept separate from the per-alternative
//! evaluators: partition into conforming and non-conforming, pick the
//! max-confidence conforming evaluation, else fall back to the first rule in
//! priority order regardless of its outcome, so the caller always receives a
//! concrete best-effort answer.

use crate::types::RuleEvaluation;

/// Index of the winning evaluation; `None` only when no rules applied.
///
/// `evaluations` must already be in priority order. Among conforming
/// evaluations a confidence tie keeps the earlier (higher-priority) rule,
/// keeping selection deterministic.
pub fn select_best(evaluations: &[RuleEvaluation]) -> Option<usize> {
    let mut winner: Option<usize> = None;
    for (idx, eval) in evaluations.iter().enumerate() {
        if !eval.is_conform {
            continue;
        }
        match winner {
            Some(best) if evaluations[best].confidence >= eval.confidence => {}
            _ => winner = Some(idx),
        }
    }

    winner.or(if evaluations.is_empty() { None } else { Some(0) })
}
