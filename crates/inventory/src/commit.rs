//! Commit boundary: the only place the engine talks to persistence.
//!
//! A commit is one mutation call followed by one audit-log call. The engine
//! does not retry and does not serialize concurrent commits; callers keep at
//! most one mutation per container in flight, and the persistence layer
//! rejects stale writes through the payload's expected version.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use stillgauge_core::{DomainError, DomainResult, TransactionId};
use stillgauge_events::{AuditEntry, Event};

use crate::bottling::{BottlingLine, BottlingPlan, BottlingQueue, BottlingRunLedger, RunUpdate};
use crate::request::{BottlingPayload, OperationRequest, PendingCommit};

/// Failure reported by the persistence API.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("version conflict: {0}")]
    Conflict(String),

    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// External persistence API for container mutations and the audit log.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn apply(&self, request: &OperationRequest) -> Result<(), ApiError>;

    async fn append_audit(&self, entry: &AuditEntry) -> Result<(), ApiError>;
}

#[async_trait]
impl<T: InventoryApi + ?Sized> InventoryApi for Arc<T> {
    async fn apply(&self, request: &OperationRequest) -> Result<(), ApiError> {
        (**self).apply(request).await
    }

    async fn append_audit(&self, entry: &AuditEntry) -> Result<(), ApiError> {
        (**self).append_audit(entry).await
    }
}

/// What a successful commit did.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReceipt {
    pub transaction_id: TransactionId,
    pub request: OperationRequest,
}

/// Result of committing a bottling queue.
///
/// Lines are applied in order and the run stops at the first failed call.
/// `applied` holds every line whose mutation landed, even if its audit entry
/// then failed; `unapplied` hands back every line that was never sent, so the
/// caller can keep them queued. An invalid pending line stops the run before
/// anything is sent and leaves all queued lines in `unapplied`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BottlingCommitReport {
    pub applied: Vec<BottlingPayload>,
    pub run_updates: Vec<RunUpdate>,
    pub failure: Option<DomainError>,
    pub unapplied: Vec<BottlingPlan>,
}

impl BottlingCommitReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Issues validated plans against an [`InventoryApi`].
#[derive(Debug, Clone)]
pub struct Committer<A> {
    api: A,
}

impl<A: InventoryApi> Committer<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Apply the mutation, then append its audit entry.
    pub async fn commit(&self, pending: impl Into<PendingCommit> + Send) -> DomainResult<CommitReceipt> {
        let PendingCommit { request, audit } = pending.into();
        self.apply(&request).await?;
        self.append_audit(&request, &audit).await?;
        Ok(CommitReceipt {
            transaction_id: audit.transaction_id,
            request,
        })
    }

    async fn apply(&self, request: &OperationRequest) -> DomainResult<()> {
        let operation = request.operation_name();
        let container_id = request.container_id();
        self.api.apply(request).await.map_err(|e| {
            tracing::error!(operation, container = %container_id, error = %e, "mutation failed");
            DomainError::commit(format!("{operation} on container {container_id}: {e}"))
        })
    }

    async fn append_audit(&self, request: &OperationRequest, audit: &AuditEntry) -> DomainResult<()> {
        let operation = request.operation_name();
        let container_id = request.container_id();
        self.api.append_audit(audit).await.map_err(|e| {
            tracing::error!(operation, container = %container_id, error = %e, "audit append failed");
            DomainError::commit(format!(
                "{operation} on container {container_id} was applied but the audit entry was not recorded: {e}"
            ))
        })?;

        tracing::info!(
            event = audit.event_type(),
            event_version = audit.version(),
            container = %audit.container_id(),
            transaction = %audit.transaction_id(),
            occurred_at = %audit.occurred_at(),
            "operation committed"
        );
        Ok(())
    }

    /// Commit every queued bottling line, then the still-pending form entry.
    ///
    /// The pending line is validated before anything is sent. Each line whose
    /// mutation lands updates `ledger`, whether or not its audit entry does.
    pub async fn commit_bottling(
        &self,
        mut queue: BottlingQueue,
        pending_line: Option<BottlingLine>,
        ledger: &mut BottlingRunLedger,
        occurred_at: DateTime<Utc>,
    ) -> BottlingCommitReport {
        let rejected = pending_line.and_then(|line| queue.enqueue(line, occurred_at).err());
        if let Some(err) = rejected {
            tracing::warn!(source = %queue.source().id_typed(), error = %err, "pending bottling line rejected");
            return BottlingCommitReport {
                failure: Some(err),
                unapplied: queue.into_items(),
                ..BottlingCommitReport::default()
            };
        }

        let mut report = BottlingCommitReport::default();
        let mut items = queue.into_items().into_iter();
        while let Some(plan) = items.next() {
            let request = OperationRequest::Bottle(plan.payload.clone());
            if let Err(err) = self.apply(&request).await {
                report.failure = Some(err);
                report.unapplied.push(plan);
                report.unapplied.extend(items.by_ref());
                break;
            }

            report.run_updates.push(ledger.record(
                plan.product_id,
                plan.payload.bottle_size_ml,
                plan.payload.number_of_bottles,
                plan.payload.bottled_wine_gallons,
            ));
            report.applied.push(plan.payload);

            if let Err(err) = self.append_audit(&request, &plan.audit).await {
                report.failure = Some(err);
                report.unapplied.extend(items.by_ref());
                break;
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjust::AdjustContainer;
    use crate::bottling::{BottleCount, RemainderPolicy};
    use crate::container::{ContainerState, ContainerType};
    use crate::engine::InventoryEngine;
    use crate::in_memory::InMemoryInventoryApi;
    use crate::request::AdjustMethod;
    use stillgauge_core::{ContainerId, ErrorKind};
    use stillgauge_gauging::Quantity;

    fn barrel() -> ContainerState {
        ContainerState::new(ContainerId::new(), "Barrel 1", ContainerType::WoodenBarrel)
            .with_contents(100.0, 200.0)
    }

    fn add_one_gallon(container: &ContainerState) -> AdjustContainer {
        AdjustContainer {
            container_id: container.id_typed(),
            method: AdjustMethod::Add,
            quantity: Quantity::WineGallons(1.0),
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn commit_applies_mutation_then_audit() {
        let engine = InventoryEngine::default();
        let api = Arc::new(InMemoryInventoryApi::new());
        let committer = Committer::new(api.clone());
        let container = barrel();
        api.register(&container);

        let plan = engine.adjust(&container, &add_one_gallon(&container)).unwrap();
        let receipt = committer.commit(plan).await.unwrap();

        assert_eq!(api.requests().len(), 1);
        assert_eq!(api.audit_log().len(), 1);
        assert_eq!(api.audit_log()[0].transaction_id, receipt.transaction_id);
        assert_eq!(api.version_of(container.id_typed()), 1);
    }

    #[tokio::test]
    async fn failed_mutation_is_prefixed_and_skips_audit() {
        let engine = InventoryEngine::default();
        let api = Arc::new(InMemoryInventoryApi::new());
        let committer = Committer::new(api.clone());
        let container = barrel();

        api.fail_next_apply(ApiError::Unavailable("connection reset".into()));
        let plan = engine.adjust(&container, &add_one_gallon(&container)).unwrap();
        let err = committer.commit(plan).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Commit);
        assert!(err.to_string().starts_with("commit failed: adjust on container"));
        assert!(err.to_string().contains("connection reset"));
        assert!(api.requests().is_empty());
        assert!(api.audit_log().is_empty());
    }

    #[tokio::test]
    async fn stale_snapshot_is_rejected_by_persistence() {
        let engine = InventoryEngine::default();
        let api = Arc::new(InMemoryInventoryApi::new());
        let committer = Committer::new(api.clone());
        let container = barrel();
        api.register(&container);

        // Two operations validated against the same snapshot: only one lands.
        let first = engine.adjust(&container, &add_one_gallon(&container)).unwrap();
        let second = engine.adjust(&container, &add_one_gallon(&container)).unwrap();
        committer.commit(first).await.unwrap();
        let err = committer.commit(second).await.unwrap_err();

        assert!(err.to_string().contains("version conflict"));
        assert_eq!(api.requests().len(), 1);
    }

    #[tokio::test]
    async fn audit_failure_is_reported_after_mutation() {
        let engine = InventoryEngine::default();
        let api = Arc::new(InMemoryInventoryApi::new());
        let committer = Committer::new(api.clone());
        let container = barrel();

        api.fail_next_audit(ApiError::Rejected("log closed".into()));
        let plan = engine.adjust(&container, &add_one_gallon(&container)).unwrap();
        let err = committer.commit(plan).await.unwrap_err();

        assert!(err.to_string().contains("was applied but the audit entry was not recorded"));
        assert_eq!(api.requests().len(), 1);
        assert!(api.audit_log().is_empty());
    }

    fn tank_with_lines(lines: usize) -> (ContainerState, BottlingQueue) {
        let engine = InventoryEngine::default();
        let tank = ContainerState::new(ContainerId::new(), "Tank 9", ContainerType::SquareTank)
            .with_contents(100.0, 20.0 * 7.7602);
        let mut queue = engine.bottling_queue(&tank);
        for _ in 0..lines {
            queue.enqueue(twelve_750s(), Utc::now()).unwrap();
        }
        (tank, queue)
    }

    fn twelve_750s() -> BottlingLine {
        BottlingLine {
            bottle_size_ml: 750,
            count: BottleCount::Bottles(12),
            remainder: RemainderPolicy::Keep,
        }
    }

    #[tokio::test]
    async fn invalid_pending_line_hands_queued_lines_back() {
        let api = Arc::new(InMemoryInventoryApi::new());
        let committer = Committer::new(api.clone());
        let (_, queue) = tank_with_lines(2);
        let mut ledger = BottlingRunLedger::new();

        let oversized = BottlingLine {
            count: BottleCount::Bottles(5000),
            ..twelve_750s()
        };
        let report = committer
            .commit_bottling(queue, Some(oversized), &mut ledger, Utc::now())
            .await;

        assert_eq!(report.failure.as_ref().map(DomainError::kind), Some(ErrorKind::Insufficiency));
        assert!(report.applied.is_empty());
        assert_eq!(report.unapplied.len(), 2);
        assert!(report.unapplied.iter().all(|p| p.payload.number_of_bottles == 12));
        assert!(api.requests().is_empty());
        assert!(ledger.runs().is_empty());
    }

    #[tokio::test]
    async fn audit_failure_still_counts_the_applied_line() {
        let api = Arc::new(InMemoryInventoryApi::new());
        let committer = Committer::new(api.clone());
        let (tank, queue) = tank_with_lines(2);
        api.register(&tank);
        let mut ledger = BottlingRunLedger::new();

        api.fail_next_audit(ApiError::Unavailable("log offline".into()));
        let report = committer.commit_bottling(queue, None, &mut ledger, Utc::now()).await;

        assert_eq!(api.requests().len(), 1);
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.run_updates, vec![RunUpdate::Created]);
        assert_eq!(ledger.runs()[0].bottle_count, 12);
        assert_eq!(report.unapplied.len(), 1);
        assert_eq!(report.unapplied[0].payload.expected_version, stillgauge_core::ExpectedVersion::exact(1));
        assert!(report
            .failure
            .unwrap()
            .to_string()
            .contains("was applied but the audit entry was not recorded"));
    }

    #[tokio::test]
    async fn unapplied_lines_commit_cleanly_on_retry() {
        let api = Arc::new(InMemoryInventoryApi::new());
        let committer = Committer::new(api.clone());
        let (tank, queue) = tank_with_lines(2);
        api.register(&tank);
        let mut ledger = BottlingRunLedger::new();

        api.fail_next_audit(ApiError::Unavailable("log offline".into()));
        let first = committer.commit_bottling(queue, None, &mut ledger, Utc::now()).await;

        let engine = InventoryEngine::default();
        let mut retry = engine.bottling_queue(&tank.clone().with_version(1));
        for plan in &first.unapplied {
            retry.enqueue(plan.line, Utc::now()).unwrap();
        }
        let second = committer.commit_bottling(retry, None, &mut ledger, Utc::now()).await;

        assert!(second.is_complete());
        assert_eq!(api.version_of(tank.id_typed()), 2);
        assert_eq!(ledger.runs()[0].bottle_count, 24);
    }
}
