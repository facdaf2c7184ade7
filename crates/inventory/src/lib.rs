//! Inventory operation validators.
//!
//! Each operation (fill, adjust, transfer, bottle, proof-down) is validated
//! against container snapshots and turned into a typed mutation payload plus
//! an audit entry. Validation is pure; only [`Committer`] performs IO.

pub mod adjust;
pub mod bottling;
pub mod commit;
pub mod container;
pub mod engine;
pub mod fill;
pub mod in_memory;
pub mod proof_down;
pub mod request;
pub mod transfer;

pub use adjust::{AdjustContainer, AdjustPlan};
pub use bottling::{
    AdjustmentKind, BOTTLES_PER_CASE, BottleCount, BottlingLine, BottlingPlan, BottlingQueue,
    BottlingRun, BottlingRunLedger, CountUnit, RemainderChoice, RemainderPolicy, RunUpdate,
    WINE_GALLONS_PER_LITER, bottle_volume_wine_gallons, max_bottles,
};
pub use commit::{ApiError, BottlingCommitReport, CommitReceipt, Committer, InventoryApi};
pub use container::{CapacityTable, ContainerCapacitySnapshot, ContainerState, ContainerType};
pub use engine::InventoryEngine;
pub use fill::{FillContainer, FillPlan};
pub use in_memory::InMemoryInventoryApi;
pub use proof_down::{ProofDown, ProofDownPlan};
pub use request::{
    AdjustMethod, AdjustPayload, BottlingPayload, FillPayload, OperationRequest, PendingCommit,
    ProofDownPayload, RemainderAction, TransferPayload,
};
pub use transfer::{TransferAmount, TransferPlan, TransferSpirit};
