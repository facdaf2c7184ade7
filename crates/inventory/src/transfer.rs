//! Moving spirit from one container to another.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stillgauge_core::{ContainerId, DomainError, DomainResult, ExpectedVersion};
use stillgauge_events::{AuditEntry, AuditQuantities, TransactionType};
use stillgauge_gauging::{NormalizedQuantity, Quantity, REFERENCE_TEMPERATURE_F, check_proof, round2};

use crate::container::{ContainerState, EPSILON};
use crate::engine::InventoryEngine;
use crate::request::{OperationRequest, PendingCommit, TransferPayload};

/// How much to move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "quantity", rename_all = "snake_case")]
pub enum TransferAmount {
    /// Everything the source currently holds.
    All,
    Quantity(Quantity),
}

/// Command: TransferSpirit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferSpirit {
    pub source_id: ContainerId,
    pub destination_id: ContainerId,
    pub amount: TransferAmount,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    pub payload: TransferPayload,
    pub audit: AuditEntry,
    pub source_net_weight_after_lbs: f64,
    pub destination_wine_gallons_after: f64,
}

impl From<TransferPlan> for PendingCommit {
    fn from(plan: TransferPlan) -> Self {
        PendingCommit {
            request: OperationRequest::Transfer(plan.payload),
            audit: plan.audit,
        }
    }
}

impl InventoryEngine {
    /// Validate a transfer, measured at the source's proof.
    ///
    /// Checks run in order: destination capacity, then source sufficiency.
    /// Product matching and proof blending in the destination are the
    /// caller's concern.
    pub fn transfer(
        &self,
        source: &ContainerState,
        destination: &ContainerState,
        cmd: &TransferSpirit,
    ) -> DomainResult<TransferPlan> {
        self.ensure_container_id(source, cmd.source_id)?;
        self.ensure_container_id(destination, cmd.destination_id)?;
        if source.id_typed() == destination.id_typed() {
            return Err(DomainError::validation(
                "source and destination must be different containers",
            ));
        }

        let gauger = self.gauger();
        let proof = check_proof("source proof", source.proof())?;
        let source_gauge = source.gauge(gauger);

        let (moved, transfer_all) = match cmd.amount {
            TransferAmount::All => {
                if source.is_empty() {
                    return Err(DomainError::validation("source container is empty"));
                }
                (
                    NormalizedQuantity {
                        weight_lbs: source_gauge.net_weight_lbs,
                        wine_gallons: source_gauge.wine_gallons,
                        proof_gallons: source_gauge.proof_gallons,
                    },
                    true,
                )
            }
            TransferAmount::Quantity(quantity) => {
                quantity.ensure_positive()?;
                (gauger.normalize(quantity, proof, REFERENCE_TEMPERATURE_F), false)
            }
        };

        let destination_snapshot = destination.capacity_snapshot(gauger, self.capacities());
        if let Err(err) = destination_snapshot.ensure_room_for(destination.name(), moved.wine_gallons) {
            tracing::warn!(destination = %destination.id_typed(), error = %err, "transfer rejected");
            return Err(err);
        }

        let available = source_gauge.net_weight_lbs;
        if moved.weight_lbs > available + EPSILON {
            let err = DomainError::insufficient(
                source.name(),
                moved.weight_lbs,
                available,
                "lbs",
            );
            tracing::warn!(source = %source.id_typed(), error = %err, "transfer rejected");
            return Err(err);
        }

        tracing::debug!(
            source = %source.id_typed(),
            destination = %destination.id_typed(),
            weight_lbs = moved.weight_lbs,
            wine_gallons = moved.wine_gallons,
            transfer_all,
            "transfer validated"
        );

        let payload = TransferPayload {
            source_container_id: source.id_typed(),
            destination_container_id: destination.id_typed(),
            proof,
            amount: moved.weight_lbs,
            transferred_wine_gallons: moved.wine_gallons,
            transfer_all,
            source_expected_version: ExpectedVersion::of(source),
            destination_expected_version: ExpectedVersion::of(destination),
        };
        let audit = AuditEntry::new(
            TransactionType::Transfer,
            source.id_typed(),
            source.name(),
            AuditQuantities {
                proof: Some(proof),
                weight_lbs: Some(moved.weight_lbs),
                wine_gallons: Some(moved.wine_gallons),
                proof_gallons: Some(moved.proof_gallons),
                bottles: None,
            },
            format!(
                "Transferred {:.2} lbs ({:.2} wine gallons) at {:.1} proof from {} to {}",
                moved.weight_lbs,
                moved.wine_gallons,
                proof,
                source.name(),
                destination.name()
            ),
            cmd.occurred_at,
        )
        .with_destination(destination.id_typed());

        Ok(TransferPlan {
            payload,
            audit,
            source_net_weight_after_lbs: round2((available - moved.weight_lbs).max(0.0)),
            destination_wine_gallons_after: round2(
                destination_snapshot.current_wine_gallons + moved.wine_gallons,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerType;

    fn container(name: &str, container_type: ContainerType) -> ContainerState {
        ContainerState::new(ContainerId::new(), name, container_type)
    }

    fn cmd(source: &ContainerState, destination: &ContainerState, amount: TransferAmount) -> TransferSpirit {
        TransferSpirit {
            source_id: source.id_typed(),
            destination_id: destination.id_typed(),
            amount,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn out_of_range_source_proof_is_rejected() {
        let engine = InventoryEngine::default();
        let source = container("Tank C", ContainerType::SquareTank).with_contents(f64::NAN, 200.0);
        let destination = container("Barrel D", ContainerType::WoodenBarrel);
        let err = engine
            .transfer(&source, &destination, &cmd(&source, &destination, TransferAmount::All))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(err.to_string().contains("source proof"));
    }

    #[test]
    fn short_source_reports_shortfall() {
        let engine = InventoryEngine::default();
        let source = container("Tank A", ContainerType::SquareTank).with_contents(80.0, 20.0);
        let destination = container("Barrel B", ContainerType::WoodenBarrel);
        let err = engine
            .transfer(
                &source,
                &destination,
                &cmd(&source, &destination, TransferAmount::Quantity(Quantity::Weight(25.0))),
            )
            .unwrap_err();
        match err {
            DomainError::Insufficient { shortfall, unit, .. } => {
                assert!((shortfall - 5.0).abs() < 1e-9);
                assert_eq!(unit, "lbs");
            }
            other => panic!("expected Insufficient, got {other:?}"),
        }
    }

    #[test]
    fn destination_capacity_is_checked_first() {
        let engine = InventoryEngine::default();
        // Source is short *and* destination is too small: capacity wins.
        let source = container("Tank A", ContainerType::SquareTank).with_contents(100.0, 50.0);
        let destination = container("Tote C", ContainerType::FiveGallonTote);
        let err = engine
            .transfer(
                &source,
                &destination,
                &cmd(&source, &destination, TransferAmount::Quantity(Quantity::WineGallons(8.0))),
            )
            .unwrap_err();
        assert_eq!(err.overage(), Some(3.0));
    }

    #[test]
    fn transfer_all_moves_entire_source() {
        let engine = InventoryEngine::default();
        let source = container("Tank A", ContainerType::SquareTank)
            .with_contents(100.0, 77.602)
            .with_version(3);
        let destination = container("Barrel B", ContainerType::WoodenBarrel).with_version(8);
        let plan = engine
            .transfer(&source, &destination, &cmd(&source, &destination, TransferAmount::All))
            .unwrap();
        assert!(plan.payload.transfer_all);
        assert_eq!(plan.payload.amount, 77.6);
        assert_eq!(plan.payload.transferred_wine_gallons, 10.0);
        assert_eq!(plan.payload.proof, 100.0);
        assert_eq!(plan.payload.source_expected_version, ExpectedVersion::exact(3));
        assert_eq!(plan.payload.destination_expected_version, ExpectedVersion::exact(8));
        assert_eq!(plan.source_net_weight_after_lbs, 0.0);
        assert_eq!(plan.destination_wine_gallons_after, 10.0);
        assert_eq!(plan.audit.destination_container_id, Some(destination.id_typed()));
    }

    #[test]
    fn transfer_all_from_empty_source_is_rejected() {
        let engine = InventoryEngine::default();
        let source = container("Tank A", ContainerType::SquareTank);
        let destination = container("Barrel B", ContainerType::WoodenBarrel);
        let err = engine
            .transfer(&source, &destination, &cmd(&source, &destination, TransferAmount::All))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn self_transfer_is_rejected() {
        let engine = InventoryEngine::default();
        let source = container("Tank A", ContainerType::SquareTank).with_contents(100.0, 50.0);
        let err = engine
            .transfer(
                &source,
                &source,
                &cmd(&source, &source, TransferAmount::Quantity(Quantity::Weight(5.0))),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
