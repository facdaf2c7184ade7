//! Append-only audit log entries.
//!
//! One entry is produced for every successful commit. A separate reporting
//! collaborator aggregates them by type and date range.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stillgauge_core::{ContainerId, TransactionId, ValueObject};

use crate::event::Event;

/// Kind of inventory transaction recorded in the audit log.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    FillContainer,
    AdjustContainerAdd,
    AdjustContainerRemove,
    Transfer,
    Bottling,
    ProofDown,
}

impl TransactionType {
    /// Wire name, as stored by the audit log.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::FillContainer => "FILL_CONTAINER",
            TransactionType::AdjustContainerAdd => "ADJUST_CONTAINER_ADD",
            TransactionType::AdjustContainerRemove => "ADJUST_CONTAINER_REMOVE",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::Bottling => "BOTTLING",
            TransactionType::ProofDown => "PROOF_DOWN",
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantities moved by a transaction. Unset fields were not part of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuantities {
    pub proof: Option<f64>,
    pub weight_lbs: Option<f64>,
    pub wine_gallons: Option<f64>,
    pub proof_gallons: Option<f64>,
    pub bottles: Option<u32>,
}

impl ValueObject for AuditQuantities {}

/// Immutable audit-log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub transaction_id: TransactionId,
    pub transaction_type: TransactionType,
    pub container_id: ContainerId,
    pub container_name: String,
    /// Counterparty of a transfer.
    pub destination_container_id: Option<ContainerId>,
    pub quantities: AuditQuantities,
    pub notes: String,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        transaction_type: TransactionType,
        container_id: ContainerId,
        container_name: impl Into<String>,
        quantities: AuditQuantities,
        notes: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: TransactionId::new(),
            transaction_type,
            container_id,
            container_name: container_name.into(),
            destination_container_id: None,
            quantities,
            notes: notes.into(),
            occurred_at,
        }
    }

    pub fn with_destination(mut self, destination: ContainerId) -> Self {
        self.destination_container_id = Some(destination);
        self
    }
}

impl Event for AuditEntry {
    fn event_type(&self) -> &'static str {
        match self.transaction_type {
            TransactionType::FillContainer => "inventory.container.filled",
            TransactionType::AdjustContainerAdd => "inventory.container.adjusted_add",
            TransactionType::AdjustContainerRemove => "inventory.container.adjusted_remove",
            TransactionType::Transfer => "inventory.container.transferred",
            TransactionType::Bottling => "inventory.container.bottled",
            TransactionType::ProofDown => "inventory.container.proofed_down",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    fn container_id(&self) -> ContainerId {
        self.container_id
    }

    fn counterparty_id(&self) -> Option<ContainerId> {
        self.destination_container_id
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_serializes_to_wire_name() {
        let json = serde_json::to_string(&TransactionType::AdjustContainerRemove).unwrap();
        assert_eq!(json, "\"ADJUST_CONTAINER_REMOVE\"");
        assert_eq!(
            TransactionType::AdjustContainerRemove.to_string(),
            "ADJUST_CONTAINER_REMOVE"
        );
    }

    #[test]
    fn entry_event_type_follows_transaction_type() {
        let entry = AuditEntry::new(
            TransactionType::ProofDown,
            ContainerId::new(),
            "Tank 2",
            AuditQuantities::default(),
            "130 -> 80 proof",
            Utc::now(),
        );
        assert_eq!(entry.event_type(), "inventory.container.proofed_down");
        assert_eq!(entry.version(), 1);
        assert!(entry.destination_container_id.is_none());
    }

    #[test]
    fn transfer_touches_both_containers() {
        let source = ContainerId::new();
        let destination = ContainerId::new();
        let entry = AuditEntry::new(
            TransactionType::Transfer,
            source,
            "Tank 1",
            AuditQuantities::default(),
            "moved 20 wine gallons",
            Utc::now(),
        )
        .with_destination(destination);

        assert!(entry.touches(source));
        assert!(entry.touches(destination));
        assert!(!entry.touches(ContainerId::new()));
        assert_eq!(Event::transaction_id(&entry), entry.transaction_id);
    }
}
