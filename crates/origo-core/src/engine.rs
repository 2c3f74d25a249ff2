//! Rule evaluation engine.
//!
//! One calculation: fetch applicable rules, evaluate every rule against the
//! request, select the best result, attach the global derived calculations.
//! Business non-outcomes (no rules, nothing qualifies) are normal results;
//! only the catalog can fail, and that failure degrades to the no-rules
//! result instead of propagating, so a single request never aborts the
//! caller.

use std::sync::Arc;

use crate::alternatives;
use crate::calculations;
use crate::catalog::RuleCatalog;
use crate::selection;
use crate::types::{
    AlternativeEvaluation, OriginCalculationRequest, OriginCalculationResult, OriginRule,
    RuleEvaluation,
};

/// The deterministic origin determination engine.
///
/// Stateless and request-scoped: construct once, share freely. Identical
/// requests against an unchanged catalog yield identical results.
pub struct OriginEngine {
    catalog: Arc<dyn RuleCatalog>,
}

impl OriginEngine {
    /// Create an engine over the given rule catalog.
    pub fn new(catalog: Arc<dyn RuleCatalog>) -> Self {
        Self { catalog }
    }

    /// Determine preferential origin for one request.
    pub fn calculate(&self, request: &OriginCalculationRequest) -> OriginCalculationResult {
        self.calculate_with_evaluations(request).0
    }

    /// Determine origin and also return every per-rule evaluation.
    ///
    /// The evaluation list (priority order) is what the consensus runtime
    /// feeds to reasoning providers; callers that only need the verdict use
    /// [`calculate`](Self::calculate).
    pub fn calculate_with_evaluations(
        &self,
        request: &OriginCalculationRequest,
    ) -> (OriginCalculationResult, Vec<RuleEvaluation>) {
        let mut rules = match self
            .catalog
            .rules_for(&request.hs_code, &request.trade_agreement)
        {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(
                    hs_code = %request.hs_code,
                    trade_agreement = %request.trade_agreement,
                    error = %e,
                    "Rule catalog lookup failed; degrading to no-rules result"
                );
                Vec::new()
            }
        };

        if rules.is_empty() {
            return (self.no_rules_result(request), Vec::new());
        }

        // Lower priority evaluates first; missing priority sorts last.
        rules.sort_by_key(OriginRule::effective_priority);

        // Every rule is evaluated independently; no early exit, no
        // cross-rule state.
        let evaluations: Vec<RuleEvaluation> = rules
            .iter()
            .map(|rule| evaluate_rule(rule, request))
            .collect();

        let Some(winner_idx) = selection::select_best(&evaluations) else {
            return (self.no_rules_result(request), evaluations);
        };
        let winner = &evaluations[winner_idx];

        let calculations = calculations::derive(request);
        let explanation = format!(
            "{} under {}: {}. Cited rule: {}. Regional value content {}, non-originating share {}.",
            if winner.is_conform {
                "Preferential origin conferred"
            } else {
                "Preferential origin not conferred"
            },
            request.trade_agreement,
            winner.explanation,
            winner.rule.rule_text,
            calculations::fmt_pct(calculations.rvc),
            calculations::fmt_pct(calculations.max_nom),
        );

        let result = OriginCalculationResult {
            is_conform: winner.is_conform,
            confidence: winner.confidence,
            explanation,
            applied_rules: rules,
            calculations,
            alternatives: winner.alternatives.clone(),
            consensus_summary: None,
            consensus_score: None,
            dissenting_opinions: Vec::new(),
            human_review_required: false,
            provider_decisions: Vec::new(),
            audit_trail: None,
        };

        (result, evaluations)
    }

    fn no_rules_result(&self, request: &OriginCalculationRequest) -> OriginCalculationResult {
        OriginCalculationResult {
            is_conform: false,
            confidence: 0.0,
            explanation: format!(
                "No applicable origin rules found for HS code {} under {}; \
                 preferential treatment cannot be assessed.",
                request.hs_code, request.trade_agreement
            ),
            applied_rules: Vec::new(),
            calculations: calculations::derive(request),
            alternatives: Vec::new(),
            consensus_summary: None,
            consensus_score: None,
            dissenting_opinions: Vec::new(),
            human_review_required: false,
            provider_decisions: Vec::new(),
            audit_trail: None,
        }
    }
}

/// Evaluate one rule: every structured alternative, then the legacy
/// free-text fallback, then failure with zero confidence.
pub fn evaluate_rule(rule: &OriginRule, request: &OriginCalculationRequest) -> RuleEvaluation {
    let mut evaluated: Vec<AlternativeEvaluation> = rule
        .conditions
        .alternatives
        .iter()
        .map(|alt| alternatives::evaluate_alternative(alt, request))
        .collect();

    // Best passing alternative wins; a confidence tie keeps the earlier one.
    let best_passing = evaluated
        .iter()
        .enumerate()
        .filter(|(_, e)| e.result)
        .max_by(|(ai, a), (bi, b)| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(bi.cmp(ai))
        })
        .map(|(idx, _)| idx);

    if let Some(idx) = best_passing {
        let eval = &evaluated[idx];
        return RuleEvaluation {
            is_conform: true,
            confidence: eval.confidence,
            explanation: format!("rule {} qualifies: {}", rule.id, eval.details),
            rule: rule.clone(),
            alternatives: evaluated,
        };
    }

    if let Some(fallback) = alternatives::evaluate_rule_text(&rule.rule_text, request) {
        let (is_conform, confidence) = (fallback.result, fallback.confidence);
        let explanation = format!("rule {}: {}", rule.id, fallback.details);
        evaluated.push(fallback);
        return RuleEvaluation {
            is_conform,
            confidence,
            explanation,
            rule: rule.clone(),
            alternatives: evaluated,
        };
    }

    RuleEvaluation {
        is_conform: false,
        confidence: 0.0,
        explanation: format!("rule {}: no qualification path satisfied", rule.id),
        rule: rule.clone(),
        alternatives: evaluated,
    }
}
