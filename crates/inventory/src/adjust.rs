//! Adding spirit to, or removing it from, a single container.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stillgauge_core::{ContainerId, DomainResult, ExpectedVersion};
use stillgauge_events::{AuditEntry, AuditQuantities, TransactionType};
use stillgauge_gauging::{Quantity, REFERENCE_TEMPERATURE_F, check_proof, round2};

use crate::container::ContainerState;
use crate::engine::InventoryEngine;
use crate::request::{AdjustMethod, AdjustPayload, OperationRequest, PendingCommit};

/// Command: AdjustContainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustContainer {
    pub container_id: ContainerId,
    pub method: AdjustMethod,
    pub quantity: Quantity,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjustPlan {
    pub payload: AdjustPayload,
    pub audit: AuditEntry,
    pub resulting_net_weight_lbs: f64,
    pub resulting_wine_gallons: f64,
    /// A removal asked for more than the container held and was clamped to empty.
    pub truncated: bool,
}

impl From<AdjustPlan> for PendingCommit {
    fn from(plan: AdjustPlan) -> Self {
        PendingCommit {
            request: OperationRequest::Adjust(plan.payload),
            audit: plan.audit,
        }
    }
}

impl InventoryEngine {
    /// Validate an adjustment at the container's current proof.
    ///
    /// Additions must fit the rated capacity. Removals never fail for being
    /// too large: the resulting weight is clamped at zero.
    pub fn adjust(&self, container: &ContainerState, cmd: &AdjustContainer) -> DomainResult<AdjustPlan> {
        self.ensure_container_id(container, cmd.container_id)?;
        check_proof("current proof", container.proof())?;
        cmd.quantity.ensure_positive()?;

        let gauger = self.gauger();
        let proof = container.proof();
        let delta = gauger.normalize(cmd.quantity, proof, REFERENCE_TEMPERATURE_F);
        let snapshot = container.capacity_snapshot(gauger, self.capacities());

        let (resulting_net, truncated) = match cmd.method {
            AdjustMethod::Add => {
                if let Err(err) = snapshot.ensure_room_for(container.name(), delta.wine_gallons) {
                    tracing::warn!(container = %container.id_typed(), error = %err, "adjustment rejected");
                    return Err(err);
                }
                (container.net_weight_lbs() + delta.weight_lbs, false)
            }
            AdjustMethod::Remove => {
                let remaining = container.net_weight_lbs() - delta.weight_lbs;
                (remaining.max(0.0), remaining < 0.0)
            }
        };
        let resulting_wine_gallons = gauger.gallons_from_weight(proof, resulting_net).0;

        tracing::debug!(
            container = %container.id_typed(),
            method = ?cmd.method,
            weight_lbs = delta.weight_lbs,
            wine_gallons = delta.wine_gallons,
            truncated,
            "adjustment validated"
        );

        let (transaction_type, verb) = match cmd.method {
            AdjustMethod::Add => (TransactionType::AdjustContainerAdd, "Added"),
            AdjustMethod::Remove => (TransactionType::AdjustContainerRemove, "Removed"),
        };
        let mut notes = format!(
            "{verb} {:.2} lbs ({:.2} wine gallons, {:.2} PG) at {:.1} proof",
            delta.weight_lbs, delta.wine_gallons, delta.proof_gallons, proof
        );
        if truncated {
            notes.push_str("; removal exceeded contents, container emptied");
        }

        let payload = AdjustPayload {
            container_id: container.id_typed(),
            method: cmd.method,
            wine_gallons: delta.wine_gallons,
            amount: delta.weight_lbs,
            expected_version: ExpectedVersion::of(container),
        };
        let audit = AuditEntry::new(
            transaction_type,
            container.id_typed(),
            container.name(),
            AuditQuantities {
                proof: Some(proof),
                weight_lbs: Some(delta.weight_lbs),
                wine_gallons: Some(delta.wine_gallons),
                proof_gallons: Some(delta.proof_gallons),
                bottles: None,
            },
            notes,
            cmd.occurred_at,
        );

        Ok(AdjustPlan {
            payload,
            audit,
            resulting_net_weight_lbs: round2(resulting_net),
            resulting_wine_gallons,
            truncated,
        })
    }
}
