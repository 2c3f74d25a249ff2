//! # origo-runtime
//!
//! Multi-provider AI consensus layer for origo origin determinations.
//!
//! The deterministic engine in `origo-core` decides; this crate
//! corroborates. It builds one natural-language case summary, fans it out to
//! every configured reasoning provider concurrently, reconciles the votes
//! into a consensus score and decides whether a human must review the case.
//!
//! ## Important
//!
//! This crate is OPTIONAL. A deployment without any reasoning provider still
//! produces complete results: the orchestrator synthesizes a consensus from
//! the deterministic rule evaluations alone. Nothing here can fail a
//! calculation — provider failures degrade, side effects are fire-and-forget.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use origo_runtime::{ConsensusConfig, ConsensusOrchestrator};
//!
//! let config = ConsensusConfig::from_yaml_file("consensus.yaml")?;
//! let orchestrator = ConsensusOrchestrator::builder(config).build();
//!
//! let (result, evaluations) = engine.calculate_with_evaluations(&request);
//! let merged = orchestrator.enrich(&request, &evaluations, &result).await;
//! ```

pub mod cache;
pub mod config;
pub mod consensus;
pub mod normalize;
pub mod providers;
pub mod sinks;
pub mod summary;

// Re-export main types at crate root
pub use config::{ConfigError, ConsensusConfig, ProviderConfig, ProviderDialect, MIN_CONSENSUS_SCORE};
pub use consensus::{ConsensusOrchestrator, ConsensusOrchestratorBuilder, ConsensusOutcome};
pub use normalize::NormalizedVote;
pub use providers::{backoff_delay, HttpProviderPool, ProviderPool};
pub use sinks::{
    AuditEvent, AuditSink, MemoryAuditSink, MemoryReviewQueue, NoopAuditSink, NoopReviewQueue,
    ReviewQueue, ReviewTask, SinkError,
};
