//! Typed mutation payloads handed to the persistence API.
//!
//! Each payload carries the version of the container snapshot it was validated
//! against, so the persistence layer can reject writes made from stale state.

use serde::{Deserialize, Serialize};

use stillgauge_core::{ContainerId, ExpectedVersion, ProductId, ValueObject};
use stillgauge_events::AuditEntry;

/// Direction of a manual adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustMethod {
    Add,
    Remove,
}

/// What happens to spirit left in the source after bottling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemainderAction {
    Keep,
    Empty,
    Loss,
    Gain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillPayload {
    pub container_id: ContainerId,
    pub product_id: Option<ProductId>,
    pub proof: f64,
    pub tare_weight_lbs: f64,
    pub gross_weight_lbs: f64,
    pub net_weight_lbs: f64,
    pub wine_gallons: f64,
    pub proof_gallons: f64,
    pub expected_version: ExpectedVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustPayload {
    pub container_id: ContainerId,
    pub method: AdjustMethod,
    pub wine_gallons: f64,
    /// Requested weight delta in lbs.
    pub amount: f64,
    pub expected_version: ExpectedVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPayload {
    pub source_container_id: ContainerId,
    pub destination_container_id: ContainerId,
    pub proof: f64,
    /// Transferred weight in lbs.
    pub amount: f64,
    pub transferred_wine_gallons: f64,
    pub transfer_all: bool,
    pub source_expected_version: ExpectedVersion,
    pub destination_expected_version: ExpectedVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BottlingPayload {
    pub container_id: ContainerId,
    #[serde(rename = "bottleSizeML")]
    pub bottle_size_ml: u32,
    pub number_of_bottles: u32,
    pub remainder_action: RemainderAction,
    pub bottled_wine_gallons: f64,
    pub remainder_weight_lbs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_amount: Option<f64>,
    pub expected_version: ExpectedVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofDownPayload {
    pub container_id: ContainerId,
    pub target_proof: f64,
    pub current_proof: f64,
    pub add_water_gallons: f64,
    pub final_wine_gallons: f64,
    pub final_gross_weight_lbs: f64,
    pub final_proof_gallons: f64,
    pub expected_version: ExpectedVersion,
}

impl ValueObject for FillPayload {}
impl ValueObject for AdjustPayload {}
impl ValueObject for TransferPayload {}
impl ValueObject for BottlingPayload {}
impl ValueObject for ProofDownPayload {}

/// A validated mutation, ready for the persistence API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationRequest {
    Fill(FillPayload),
    Adjust(AdjustPayload),
    Transfer(TransferPayload),
    Bottle(BottlingPayload),
    ProofDown(ProofDownPayload),
}

impl OperationRequest {
    /// Container the mutation is issued against (the source, for transfers).
    pub fn container_id(&self) -> ContainerId {
        match self {
            OperationRequest::Fill(p) => p.container_id,
            OperationRequest::Adjust(p) => p.container_id,
            OperationRequest::Transfer(p) => p.source_container_id,
            OperationRequest::Bottle(p) => p.container_id,
            OperationRequest::ProofDown(p) => p.container_id,
        }
    }

    /// Every container touched, with the version each was validated against.
    pub fn touched(&self) -> Vec<(ContainerId, ExpectedVersion)> {
        match self {
            OperationRequest::Fill(p) => vec![(p.container_id, p.expected_version)],
            OperationRequest::Adjust(p) => vec![(p.container_id, p.expected_version)],
            OperationRequest::Transfer(p) => vec![
                (p.source_container_id, p.source_expected_version),
                (p.destination_container_id, p.destination_expected_version),
            ],
            OperationRequest::Bottle(p) => vec![(p.container_id, p.expected_version)],
            OperationRequest::ProofDown(p) => vec![(p.container_id, p.expected_version)],
        }
    }

    pub fn operation_name(&self) -> &'static str {
        match self {
            OperationRequest::Fill(_) => "fill",
            OperationRequest::Adjust(_) => "adjust",
            OperationRequest::Transfer(_) => "transfer",
            OperationRequest::Bottle(_) => "bottle",
            OperationRequest::ProofDown(_) => "proof_down",
        }
    }
}

/// A mutation plus the audit entry that records it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCommit {
    pub request: OperationRequest,
    pub audit: AuditEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottling_payload_uses_wire_field_names() {
        let payload = BottlingPayload {
            container_id: ContainerId::new(),
            bottle_size_ml: 750,
            number_of_bottles: 12,
            remainder_action: RemainderAction::Keep,
            bottled_wine_gallons: 2.38,
            remainder_weight_lbs: 40.0,
            adjustment_amount: None,
            expected_version: ExpectedVersion::exact(1),
        };
        let json = serde_json::to_value(OperationRequest::Bottle(payload)).unwrap();
        assert_eq!(json["operation"], "bottle");
        assert_eq!(json["bottleSizeML"], 750);
        assert_eq!(json["numberOfBottles"], 12);
        assert_eq!(json["remainderAction"], "keep");
        assert!(json.get("adjustmentAmount").is_none());
    }

    #[test]
    fn transfer_touches_both_containers() {
        let source = ContainerId::new();
        let destination = ContainerId::new();
        let request = OperationRequest::Transfer(TransferPayload {
            source_container_id: source,
            destination_container_id: destination,
            proof: 120.0,
            amount: 100.0,
            transferred_wine_gallons: 13.18,
            transfer_all: false,
            source_expected_version: ExpectedVersion::exact(4),
            destination_expected_version: ExpectedVersion::exact(9),
        });
        assert_eq!(request.container_id(), source);
        assert_eq!(
            request.touched(),
            vec![
                (source, ExpectedVersion::exact(4)),
                (destination, ExpectedVersion::exact(9)),
            ]
        );
    }
}
