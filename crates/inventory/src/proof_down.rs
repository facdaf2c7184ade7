//! Diluting a container to a lower proof with water.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stillgauge_core::{ContainerId, DomainError, DomainResult, ExpectedVersion};
use stillgauge_events::{AuditEntry, AuditQuantities, TransactionType};
use stillgauge_gauging::{REFERENCE_TEMPERATURE_F, check_proof, round2};

use crate::container::{ContainerCapacitySnapshot, ContainerState};
use crate::engine::InventoryEngine;
use crate::request::{OperationRequest, PendingCommit, ProofDownPayload};

/// Command: ProofDown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofDown {
    pub container_id: ContainerId,
    pub target_proof: f64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProofDownPlan {
    pub payload: ProofDownPayload,
    pub audit: AuditEntry,
    pub current_wine_gallons: f64,
    pub current_proof_gallons: f64,
    pub final_net_weight_lbs: f64,
}

impl From<ProofDownPlan> for PendingCommit {
    fn from(plan: ProofDownPlan) -> Self {
        PendingCommit {
            request: OperationRequest::ProofDown(plan.payload),
            audit: plan.audit,
        }
    }
}

impl InventoryEngine {
    /// Validate a dilution. Proof gallons are conserved; wine gallons grow.
    pub fn proof_down(&self, container: &ContainerState, cmd: &ProofDown) -> DomainResult<ProofDownPlan> {
        self.ensure_container_id(container, cmd.container_id)?;

        let current_proof = check_proof("current proof", container.proof())?;
        let target = cmd.target_proof;
        if !(target.is_finite() && target > 0.0) {
            return Err(DomainError::validation("target proof must be greater than 0"));
        }
        if target >= current_proof {
            return Err(DomainError::validation(format!(
                "target proof {target:.1} must be lower than current proof {current_proof:.1}"
            )));
        }
        if container.is_empty() {
            return Err(DomainError::validation(format!("{} is empty", container.name())));
        }

        let gauger = self.gauger();
        let (current_wine_gallons, current_proof_gallons) =
            gauger.gallons_from_weight(current_proof, container.net_weight_lbs());

        let final_wine_gallons = current_proof_gallons / (target / 100.0);
        let add_water_gallons = (final_wine_gallons - current_wine_gallons).max(0.0);
        let final_net_weight = final_wine_gallons * gauger.spirit_density(target, REFERENCE_TEMPERATURE_F);
        let final_gross_weight = container.tare_weight_lbs() + final_net_weight;
        let final_proof_gallons = final_wine_gallons * target / 100.0;

        let capacity = self.capacities().capacity(container.container_type());
        ContainerCapacitySnapshot::new(capacity, 0.0)
            .ensure_room_for(container.name(), final_wine_gallons)
            .inspect_err(|err| {
                tracing::warn!(container = %container.id_typed(), error = %err, "proof-down rejected");
            })?;

        tracing::debug!(
            container = %container.id_typed(),
            current_proof,
            target_proof = target,
            add_water_gallons,
            final_wine_gallons,
            "proof-down validated"
        );

        let payload = ProofDownPayload {
            container_id: container.id_typed(),
            target_proof: target,
            current_proof,
            add_water_gallons: round2(add_water_gallons),
            final_wine_gallons: round2(final_wine_gallons),
            final_gross_weight_lbs: round2(final_gross_weight),
            final_proof_gallons: round2(final_proof_gallons),
            expected_version: ExpectedVersion::of(container),
        };
        let audit = AuditEntry::new(
            TransactionType::ProofDown,
            container.id_typed(),
            container.name(),
            AuditQuantities {
                proof: Some(target),
                weight_lbs: Some(round2(final_net_weight)),
                wine_gallons: Some(round2(final_wine_gallons)),
                proof_gallons: Some(round2(final_proof_gallons)),
                bottles: None,
            },
            format!(
                "Proofed down from {current_proof:.1} to {target:.1} proof, added {add_water_gallons:.2} gallons of water"
            ),
            cmd.occurred_at,
        );

        Ok(ProofDownPlan {
            payload,
            audit,
            current_wine_gallons,
            current_proof_gallons,
            final_net_weight_lbs: round2(final_net_weight),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::container::{CapacityTable, ContainerType};
    use proptest::prelude::*;
    use stillgauge_gauging::Gauger;

    fn tote(proof: f64, net: f64) -> ContainerState {
        ContainerState::new(ContainerId::new(), "Tote 1", ContainerType::Tote)
            .with_tare(140.0)
            .with_contents(proof, net)
    }

    fn cmd(container: &ContainerState, target_proof: f64) -> ProofDown {
        ProofDown {
            container_id: container.id_typed(),
            target_proof,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn unreadable_snapshot_proof_is_rejected() {
        let engine = InventoryEngine::default();
        for proof in [f64::NAN, 250.0] {
            let container = tote(proof, 400.0);
            let err = engine.proof_down(&container, &cmd(&container, 80.0)).unwrap_err();
            assert!(err.to_string().contains("current proof"), "{proof}: {err}");
        }
    }

    #[test]
    fn proof_gallons_are_conserved() {
        let engine = InventoryEngine::default();
        let container = tote(130.0, 400.0);
        let plan = engine.proof_down(&container, &cmd(&container, 80.0)).unwrap();

        assert!((plan.payload.final_proof_gallons - plan.current_proof_gallons).abs() <= 0.01);
        assert!(plan.payload.final_wine_gallons > plan.current_wine_gallons);
        assert_eq!(
            plan.payload.add_water_gallons,
            round2(plan.current_proof_gallons / 0.8 - plan.current_wine_gallons)
        );
        assert_eq!(
            plan.payload.final_gross_weight_lbs,
            round2(140.0 + plan.current_proof_gallons / 0.8 * 7.9096)
        );
    }

    #[test]
    fn target_must_be_lower_and_positive() {
        let engine = InventoryEngine::default();
        let container = tote(100.0, 400.0);
        for target in [100.0, 120.0, 0.0, -5.0, f64::NAN] {
            let err = engine.proof_down(&container, &cmd(&container, target)).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "target {target}");
        }
    }

    #[test]
    fn dilution_past_capacity_reports_overage() {
        let engine = InventoryEngine::default();
        let barrel = ContainerState::new(ContainerId::new(), "Barrel 9", ContainerType::WoodenBarrel)
            .with_contents(130.0, 400.0);
        let err = engine.proof_down(&barrel, &cmd(&barrel, 80.0)).unwrap_err();
        let overage = err.overage().unwrap();
        let (_, pg) = engine.gauger().gallons_from_weight(130.0, 400.0);
        assert_eq!(overage, round2(pg / 0.8 - 53.0));
    }

    #[test]
    fn empty_container_cannot_be_proofed_down() {
        let engine = InventoryEngine::default();
        let container = tote(130.0, 0.0);
        assert!(engine.proof_down(&container, &cmd(&container, 80.0)).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: dilution never changes proof gallons beyond rounding.
        #[test]
        fn dilution_conserves_proof_gallons(
            current in 60.0f64..190.0,
            ratio in 0.3f64..0.95,
            net in 10.0f64..1_500.0,
        ) {
            let capacities = CapacityTable::with_overrides([(ContainerType::Tote, 10_000.0)]).unwrap();
            let engine = InventoryEngine::new(Gauger::representative(), Arc::new(capacities));
            let container = tote(current, net);
            let plan = engine.proof_down(&container, &cmd(&container, current * ratio)).unwrap();
            prop_assert!((plan.payload.final_proof_gallons - plan.current_proof_gallons).abs() <= 0.01);
            prop_assert!(plan.payload.add_water_gallons >= 0.0);
        }
    }
}
