//! Aggregate root trait and optimistic concurrency token.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Aggregate root marker + minimal interface.
///
/// The engine never stores aggregates itself; it only reads snapshots handed in
/// by the caller. The version lets the persistence layer reject writes that
/// were validated against a stale snapshot.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the persisted state.
    fn version(&self) -> u64;
}

/// Version a write expects its aggregate to be at.
///
/// Every mutation carries one, taken from the snapshot it was validated
/// against; persistence rejects the write when the stored version moved on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectedVersion(u64);

impl ExpectedVersion {
    pub fn exact(version: u64) -> Self {
        Self(version)
    }

    /// Expect exactly the version of the snapshot an operation was validated against.
    pub fn of<A: AggregateRoot>(aggregate: &A) -> Self {
        Self(aggregate.version())
    }

    pub fn matches(self, actual: u64) -> bool {
        self.0 == actual
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "expected version {}, found {actual}",
                self.0
            )))
        }
    }
}
