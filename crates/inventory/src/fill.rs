//! Recording a fresh gauge of a container's contents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stillgauge_core::{ContainerId, DomainError, DomainResult, ExpectedVersion, ProductId};
use stillgauge_events::{AuditEntry, AuditQuantities, TransactionType};
use stillgauge_gauging::{SpiritMeasurement, check_proof};

use crate::container::{ContainerCapacitySnapshot, ContainerState};
use crate::engine::InventoryEngine;
use crate::request::{FillPayload, OperationRequest, PendingCommit};

/// Command: record what a container now holds (usually produced by a `FillForm`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillContainer {
    pub container_id: ContainerId,
    pub product_id: Option<ProductId>,
    pub measurement: SpiritMeasurement,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillPlan {
    pub payload: FillPayload,
    pub audit: AuditEntry,
}

impl From<FillPlan> for PendingCommit {
    fn from(plan: FillPlan) -> Self {
        PendingCommit {
            request: OperationRequest::Fill(plan.payload),
            audit: plan.audit,
        }
    }
}

impl InventoryEngine {
    /// Validate a fill: the measured volume must fit the container.
    pub fn fill(&self, container: &ContainerState, cmd: &FillContainer) -> DomainResult<FillPlan> {
        self.ensure_container_id(container, cmd.container_id)?;
        let m = &cmd.measurement;
        check_proof("proof", m.proof)?;
        if m.wine_gallons <= 0.0 {
            return Err(DomainError::validation("fill quantity must be greater than 0"));
        }

        // The fill replaces the container's contents, so measure against an empty container.
        let capacity = self.capacities().capacity(container.container_type());
        ContainerCapacitySnapshot::new(capacity, 0.0).ensure_room_for(container.name(), m.wine_gallons)?;

        tracing::debug!(
            container = %container.id_typed(),
            wine_gallons = m.wine_gallons,
            proof = m.proof,
            "fill validated"
        );

        let payload = FillPayload {
            container_id: container.id_typed(),
            product_id: cmd.product_id.or(container.product_id()),
            proof: m.proof,
            tare_weight_lbs: m.tare_weight_lbs,
            gross_weight_lbs: m.gross_weight_lbs,
            net_weight_lbs: m.net_weight_lbs,
            wine_gallons: m.wine_gallons,
            proof_gallons: m.proof_gallons,
            expected_version: ExpectedVersion::of(container),
        };
        let audit = AuditEntry::new(
            TransactionType::FillContainer,
            container.id_typed(),
            container.name(),
            AuditQuantities {
                proof: Some(m.proof),
                weight_lbs: Some(m.net_weight_lbs),
                wine_gallons: Some(m.wine_gallons),
                proof_gallons: Some(m.proof_gallons),
                bottles: None,
            },
            format!(
                "Filled with {:.2} wine gallons at {:.1} proof ({:.2} PG)",
                m.wine_gallons, m.proof, m.proof_gallons
            ),
            cmd.occurred_at,
        );
        Ok(FillPlan { payload, audit })
    }
}
