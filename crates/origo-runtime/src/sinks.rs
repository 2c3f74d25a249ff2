//! Audit and human-review sinks.
//!
//! Both sinks are external collaborators reached through narrow, best-effort
//! interfaces. The orchestrator fires them off the critical path and
//! swallows failures: a down audit store or review queue never changes a
//! calculation's outcome.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a sink delivery attempt.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// One append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// What happened, e.g. "origin_consensus_run"
    pub action: String,

    /// Resource kind, e.g. "origin_calculation"
    pub resource: String,

    /// Correlation id; the product SKU for calculations
    pub resource_id: String,

    /// Full payload of the event
    pub details: serde_json::Value,

    /// Whether the underlying operation succeeded
    pub success: bool,
}

/// One human-review work item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewTask {
    pub request_id: String,
    pub product_sku: String,
    pub hs_code: String,
    pub trade_agreement: String,

    /// Why the case was flagged
    pub reason: String,

    /// Consensus narrative handed to the reviewer
    pub ai_summary: String,

    /// Rationales of dissenting providers
    pub dissenting_opinions: Vec<String>,
}

/// Append-only audit log. At-least-once delivery is acceptable.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log_action(&self, event: AuditEvent) -> Result<(), SinkError>;
}

/// Human-review queue. A duplicate ticket is tolerable; a lost one is not
/// fatal to the calculation.
#[async_trait]
pub trait ReviewQueue: Send + Sync {
    async fn enqueue(&self, task: ReviewTask) -> Result<(), SinkError>;
}

/// In-memory audit sink for tests and the CLI.
#[derive(Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records logged so far.
    pub fn records(&self) -> Vec<AuditEvent> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn log_action(&self, event: AuditEvent) -> Result<(), SinkError> {
        self.records.lock().push(event);
        Ok(())
    }
}

/// In-memory review queue for tests and the CLI.
#[derive(Default)]
pub struct MemoryReviewQueue {
    tasks: Mutex<Vec<ReviewTask>>,
}

impl MemoryReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the tasks enqueued so far.
    pub fn tasks(&self) -> Vec<ReviewTask> {
        self.tasks.lock().clone()
    }
}

#[async_trait]
impl ReviewQueue for MemoryReviewQueue {
    async fn enqueue(&self, task: ReviewTask) -> Result<(), SinkError> {
        self.tasks.lock().push(task);
        Ok(())
    }
}

/// Audit sink that drops everything; for embedders wiring their own.
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn log_action(&self, _event: AuditEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Review queue that drops everything; for embedders wiring their own.
pub struct NoopReviewQueue;

#[async_trait]
impl ReviewQueue for NoopReviewQueue {
    async fn enqueue(&self, _task: ReviewTask) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_audit_sink_appends() {
        let sink = MemoryAuditSink::new();
        sink.log_action(AuditEvent {
            action: "origin_consensus_run".to_string(),
            resource: "origin_calculation".to_string(),
            resource_id: "SKU-1".to_string(),
            details: serde_json::json!({ "score": 0.9 }),
            success: true,
        })
        .await
        .unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].resource_id, "SKU-1");
    }

    #[tokio::test]
    async fn test_memory_review_queue_appends() {
        let queue = MemoryReviewQueue::new();
        queue
            .enqueue(ReviewTask {
                request_id: "SKU-1-0".to_string(),
                product_sku: "SKU-1".to_string(),
                hs_code: "390110".to_string(),
                trade_agreement: "CETA".to_string(),
                reason: "mixed provider votes".to_string(),
                ai_summary: String::new(),
                dissenting_opinions: vec![],
            })
            .await
            .unwrap();

        assert_eq!(queue.tasks().len(), 1);
    }
}
