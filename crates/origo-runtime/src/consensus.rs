//! Consensus orchestrator.
//!
//! Takes the engine's deterministic result, fans the case out to every
//! active reasoning provider concurrently, reconciles the votes and decides
//! whether a human must review the case. The orchestrator never fails a
//! calculation: with no usable providers it synthesizes a consensus from the
//! rule evaluations alone, and audit/queue side effects are fire-and-forget.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use origo_core::{
    ConsensusAuditTrail, Decision, OriginCalculationRequest, OriginCalculationResult,
    ProviderCallResult, RuleEvaluation,
};

use crate::cache::{VerdictCache, VerdictKey};
use crate::config::{ConsensusConfig, ProviderConfig, MIN_CONSENSUS_SCORE};
use crate::normalize::{clamp_confidence, NormalizedVote};
use crate::providers::{HttpProviderPool, ProviderPool};
use crate::sinks::{AuditEvent, AuditSink, NoopAuditSink, NoopReviewQueue, ReviewQueue, ReviewTask};
use crate::summary;

/// Outcome of one consensus run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusOutcome {
    /// True when live provider votes contributed; false on the synthetic path
    pub enabled: bool,

    /// Aggregate confidence, always within `[MIN_CONSENSUS_SCORE, 1]`
    pub consensus_score: f64,

    /// Narrative of the run; never empty
    pub consensus_summary: String,

    /// Rationales of providers that disagreed with the consensus decision
    pub dissenting_opinions: Vec<String>,

    /// Every provider outcome, including skips and errors
    pub provider_decisions: Vec<ProviderCallResult>,

    /// Whether the case must be reviewed by a human
    pub requires_human_review: bool,

    /// Why the case was flagged; empty when no review is required
    #[serde(default)]
    pub review_reasons: Vec<String>,

    /// Audit snapshot of the run
    pub audit_trail: ConsensusAuditTrail,
}

/// The consensus orchestrator.
///
/// Stateless across requests; configuration and collaborators are injected
/// once at construction so tests can substitute all of them.
pub struct ConsensusOrchestrator {
    config: ConsensusConfig,
    pool: Arc<dyn ProviderPool>,
    audit: Arc<dyn AuditSink>,
    reviews: Arc<dyn ReviewQueue>,
    cache: Option<VerdictCache>,
}

impl ConsensusOrchestrator {
    /// Create an orchestrator with no-op sinks.
    pub fn new(config: ConsensusConfig, pool: Arc<dyn ProviderPool>) -> Self {
        let cache = config
            .cache_ttl
            .map(|ttl| VerdictCache::new(10_000, ttl));
        Self {
            config,
            pool,
            audit: Arc::new(NoopAuditSink),
            reviews: Arc::new(NoopReviewQueue),
            cache,
        }
    }

    /// Start building an orchestrator.
    pub fn builder(config: ConsensusConfig) -> ConsensusOrchestratorBuilder {
        ConsensusOrchestratorBuilder::new(config)
    }

    /// Run consensus over one calculation.
    ///
    /// # Execution Flow
    /// 1. Collect active providers (none, or consensus disabled → synthetic)
    /// 2. Build one case prompt and fan it out concurrently
    /// 3. Wait for every provider to settle (success, skip or terminal error)
    /// 4. Count votes over successes only; all failed → synthetic fallback
    /// 5. Fire audit and, when flagged, review-queue side effects
    ///
    /// Dropping the returned future cancels in-flight provider calls; there
    /// is no partial result.
    pub async fn run(
        &self,
        request: &OriginCalculationRequest,
        evaluations: &[RuleEvaluation],
        engine_result: &OriginCalculationResult,
    ) -> ConsensusOutcome {
        let active = if self.config.enabled {
            self.pool.active()
        } else {
            Vec::new()
        };

        let outcome = if active.is_empty() {
            let note = if self.config.enabled {
                "no active reasoning providers"
            } else {
                "consensus disabled by configuration"
            };
            self.synthetic_outcome(evaluations, engine_result, Vec::new(), note)
        } else {
            let prompt = summary::build_prompt(request, evaluations, engine_result);
            let decisions: Vec<ProviderCallResult> =
                join_all(active.iter().map(|p| self.call_provider(p, &prompt))).await;

            let tally = tally_votes(&decisions);
            if tally.successes == 0 {
                self.synthetic_outcome(
                    evaluations,
                    engine_result,
                    decisions,
                    "all providers skipped or failed",
                )
            } else {
                self.live_outcome(engine_result, decisions, tally)
            }
        };

        self.dispatch_side_effects(request, &outcome);
        outcome
    }

    /// Run consensus and merge the outcome into the engine's result.
    ///
    /// The merged explanation appends the consensus narrative; the merged
    /// confidence is the maximum of the engine's and the consensus score —
    /// corroboration can raise displayed confidence, never lower it.
    /// Divergence surfaces through `human_review_required` and
    /// `dissenting_opinions` instead.
    pub async fn enrich(
        &self,
        request: &OriginCalculationRequest,
        evaluations: &[RuleEvaluation],
        engine_result: &OriginCalculationResult,
    ) -> OriginCalculationResult {
        let outcome = self.run(request, evaluations, engine_result).await;

        let mut merged = engine_result.clone();
        merged.explanation = format!(
            "{}\n\n{}",
            engine_result.explanation, outcome.consensus_summary
        );
        merged.confidence = engine_result.confidence.max(outcome.consensus_score);
        merged.consensus_score = Some(outcome.consensus_score);
        merged.dissenting_opinions = outcome.dissenting_opinions;
        merged.human_review_required = outcome.requires_human_review;
        merged.provider_decisions = outcome.provider_decisions;
        merged.audit_trail = Some(outcome.audit_trail);
        merged.consensus_summary = Some(outcome.consensus_summary);
        merged
    }

    /// Call one provider, via the verdict cache when configured.
    async fn call_provider(&self, provider: &ProviderConfig, prompt: &str) -> ProviderCallResult {
        let Some(cache) = &self.cache else {
            return self.pool.call(provider, prompt).await;
        };

        let key = VerdictKey::new(&provider.id, prompt);
        if let Some(vote) = cache.get(&key).await {
            tracing::debug!(provider = %provider.id, "Verdict served from cache");
            return ProviderCallResult::Ok {
                provider_id: provider.id.clone(),
                decision: vote.decision,
                confidence: vote.confidence,
                rationale: vote.rationale,
                latency_ms: 0,
            };
        }

        let result = self.pool.call(provider, prompt).await;
        if let ProviderCallResult::Ok {
            decision,
            confidence,
            rationale,
            ..
        } = &result
        {
            cache
                .insert(
                    key,
                    NormalizedVote {
                        decision: *decision,
                        confidence: *confidence,
                        rationale: rationale.clone(),
                    },
                )
                .await;
        }
        result
    }

    /// Consensus from live provider votes.
    fn live_outcome(
        &self,
        engine_result: &OriginCalculationResult,
        decisions: Vec<ProviderCallResult>,
        tally: VoteTally,
    ) -> ConsensusOutcome {
        let decision = consensus_decision(&tally, engine_result.is_conform);
        let score = clamp_confidence(
            tally.confidence_sum / tally.successes as f64,
            MIN_CONSENSUS_SCORE,
        );

        let dissenting_opinions: Vec<String> = decisions
            .iter()
            .filter_map(|d| match d {
                ProviderCallResult::Ok {
                    provider_id,
                    decision: vote,
                    rationale,
                    ..
                } if *vote != decision => Some(format!("{}: {}", provider_id, rationale)),
                _ => None,
            })
            .collect();

        let mut review_reasons = Vec::new();
        if score < self.config.hitl_threshold {
            review_reasons.push(format!(
                "consensus score {:.2} below review threshold {:.2}",
                score, self.config.hitl_threshold
            ));
        }
        if tally.conform > 0 && tally.non_conform > 0 {
            review_reasons.push("providers split between conform and non-conform".to_string());
        }
        if tally.inconclusive * 2 > tally.successes {
            review_reasons.push("majority of provider replies inconclusive".to_string());
        }
        let requires_human_review = !review_reasons.is_empty();

        let mut consensus_summary = format!(
            "Consensus of {} providers: {} conform, {} non-conform, {} inconclusive; \
             decision {}, score {:.2}.",
            tally.successes,
            tally.conform,
            tally.non_conform,
            tally.inconclusive,
            decision,
            score
        );
        if requires_human_review {
            consensus_summary.push_str(&format!(
                " Flagged for human review: {}.",
                review_reasons.join("; ")
            ));
        }

        ConsensusOutcome {
            enabled: true,
            consensus_score: score,
            consensus_summary,
            dissenting_opinions,
            audit_trail: ConsensusAuditTrail {
                consensus_score: score,
                required_threshold: self.config.hitl_threshold,
                provider_decisions: decisions.clone(),
                generated_at: Utc::now(),
            },
            provider_decisions: decisions,
            requires_human_review,
            review_reasons,
        }
    }

    /// Consensus synthesized from the deterministic rule evaluations alone.
    fn synthetic_outcome(
        &self,
        evaluations: &[RuleEvaluation],
        engine_result: &OriginCalculationResult,
        provider_decisions: Vec<ProviderCallResult>,
        note: &str,
    ) -> ConsensusOutcome {
        let conform = evaluations.iter().filter(|e| e.is_conform).count();
        let non_conform = evaluations.len() - conform;

        let score = if evaluations.is_empty() {
            MIN_CONSENSUS_SCORE
        } else {
            let mean =
                evaluations.iter().map(|e| e.confidence).sum::<f64>() / evaluations.len() as f64;
            clamp_confidence(mean, MIN_CONSENSUS_SCORE)
        };

        // The rule-evaluation majority acts as the vote; a tie never
        // contradicts the engine.
        let majority_diverges = conform != non_conform
            && (conform > non_conform) != engine_result.is_conform;

        let mut review_reasons = Vec::new();
        if majority_diverges {
            review_reasons
                .push("rule evaluation majority diverges from engine decision".to_string());
        }
        if score < self.config.hitl_threshold {
            review_reasons.push(format!(
                "synthetic score {:.2} below review threshold {:.2}",
                score, self.config.hitl_threshold
            ));
        }
        let requires_human_review = !review_reasons.is_empty();

        let mut consensus_summary = format!(
            "Synthetic consensus ({}): {} of {} rule evaluations conform, score {:.2}; \
             engine decision {}.",
            note,
            conform,
            evaluations.len(),
            score,
            if engine_result.is_conform {
                "conform"
            } else {
                "non-conform"
            }
        );
        if requires_human_review {
            consensus_summary.push_str(&format!(
                " Flagged for human review: {}.",
                review_reasons.join("; ")
            ));
        }

        ConsensusOutcome {
            enabled: false,
            consensus_score: score,
            consensus_summary,
            dissenting_opinions: Vec::new(),
            audit_trail: ConsensusAuditTrail {
                consensus_score: score,
                required_threshold: self.config.hitl_threshold,
                provider_decisions: provider_decisions.clone(),
                generated_at: Utc::now(),
            },
            provider_decisions,
            requires_human_review,
            review_reasons,
        }
    }

    /// Fire the audit record and, when flagged, the review task. Neither is
    /// awaited on the critical path; failures are logged and swallowed.
    fn dispatch_side_effects(&self, request: &OriginCalculationRequest, outcome: &ConsensusOutcome) {
        let audit = Arc::clone(&self.audit);
        let event = AuditEvent {
            action: "origin_consensus_run".to_string(),
            resource: "origin_calculation".to_string(),
            resource_id: request.product_sku.clone(),
            details: serde_json::to_value(outcome).unwrap_or(serde_json::Value::Null),
            success: true,
        };
        tokio::spawn(async move {
            if let Err(e) = audit.log_action(event).await {
                tracing::warn!(error = %e, "Audit write failed; continuing");
            }
        });

        if outcome.requires_human_review {
            let reviews = Arc::clone(&self.reviews);
            let task = ReviewTask {
                request_id: format!(
                    "{}-{}",
                    request.product_sku,
                    outcome.audit_trail.generated_at.timestamp_millis()
                ),
                product_sku: request.product_sku.clone(),
                hs_code: request.hs_code.clone(),
                trade_agreement: request.trade_agreement.clone(),
                reason: outcome.review_reasons.join("; "),
                ai_summary: outcome.consensus_summary.clone(),
                dissenting_opinions: outcome.dissenting_opinions.clone(),
            };
            tokio::spawn(async move {
                if let Err(e) = reviews.enqueue(task).await {
                    tracing::warn!(error = %e, "Review enqueue failed; continuing");
                }
            });
        }
    }
}

/// Builder for [`ConsensusOrchestrator`].
pub struct ConsensusOrchestratorBuilder {
    config: ConsensusConfig,
    pool: Option<Arc<dyn ProviderPool>>,
    audit: Arc<dyn AuditSink>,
    reviews: Arc<dyn ReviewQueue>,
}

impl ConsensusOrchestratorBuilder {
    /// Start from a configuration.
    pub fn new(config: ConsensusConfig) -> Self {
        Self {
            config,
            pool: None,
            audit: Arc::new(NoopAuditSink),
            reviews: Arc::new(NoopReviewQueue),
        }
    }

    /// Substitute the provider pool (defaults to the HTTP pool).
    pub fn pool(mut self, pool: Arc<dyn ProviderPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Attach an audit sink.
    pub fn audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Attach a review queue.
    pub fn review_queue(mut self, reviews: Arc<dyn ReviewQueue>) -> Self {
        self.reviews = reviews;
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> ConsensusOrchestrator {
        let pool = self
            .pool
            .unwrap_or_else(|| Arc::new(HttpProviderPool::from_config(&self.config)));
        let cache = self
            .config
            .cache_ttl
            .map(|ttl| VerdictCache::new(10_000, ttl));
        ConsensusOrchestrator {
            config: self.config,
            pool,
            audit: self.audit,
            reviews: self.reviews,
            cache,
        }
    }
}

/// Vote counts over one decision set. Successes only; skips and errors are
/// excluded from voting but stay visible in the audit trail.
#[derive(Debug, Default)]
struct VoteTally {
    conform: usize,
    non_conform: usize,
    inconclusive: usize,
    confidence_sum: f64,
    successes: usize,
}

fn tally_votes(decisions: &[ProviderCallResult]) -> VoteTally {
    let mut tally = VoteTally::default();
    for decision in decisions {
        if let ProviderCallResult::Ok {
            decision: vote,
            confidence,
            ..
        } = decision
        {
            tally.successes += 1;
            tally.confidence_sum += confidence;
            match vote {
                Decision::Conform => tally.conform += 1,
                Decision::NonConform => tally.non_conform += 1,
                Decision::Inconclusive => tally.inconclusive += 1,
            }
        }
    }
    tally
}

/// Majority vote; ties resolve in favor of the engine's decision.
fn consensus_decision(tally: &VoteTally, engine_is_conform: bool) -> Decision {
    if tally.conform > tally.non_conform {
        Decision::Conform
    } else if tally.non_conform > tally.conform {
        Decision::NonConform
    } else if engine_is_conform {
        Decision::Conform
    } else {
        Decision::NonConform
    }
}
