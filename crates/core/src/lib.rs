//! Shared building blocks for the gauging engine: ids, errors, aggregate versions.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error taxonomy, typed identifiers and the optimistic concurrency token
//! carried by every mutation payload.

pub mod aggregate;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{ContainerId, ProductId, TransactionId};
pub use value_object::ValueObject;
