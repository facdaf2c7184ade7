//! Audit events emitted alongside every committed inventory operation.

pub mod audit;
pub mod event;

pub use audit::{AuditEntry, AuditQuantities, TransactionType};
pub use event::Event;
