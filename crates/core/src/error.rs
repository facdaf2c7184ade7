//! Domain error model.

use thiserror::Error;

/// Result type used across the engine.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every rejection is raised before any external call is made, except
/// `Commit`, which wraps a failure reported by the persistence API after
/// validation succeeded.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A raw field was missing, non-numeric or out of range.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The predicted post-operation volume exceeds the container's rated capacity.
    #[error(
        "capacity exceeded for {container}: rated {capacity_gallons:.2} gal, over by {overage_gallons:.2} gal"
    )]
    CapacityExceeded {
        container: String,
        capacity_gallons: f64,
        overage_gallons: f64,
    },

    /// The requested removal exceeds what the source holds.
    #[error(
        "insufficient quantity in {container}: requested {requested:.2} {unit}, available {available:.2} {unit}, short by {shortfall:.2} {unit}"
    )]
    Insufficient {
        container: String,
        requested: f64,
        available: f64,
        shortfall: f64,
        unit: String,
    },

    /// The downstream persistence call failed after validation passed.
    #[error("commit failed: {0}")]
    Commit(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Coarse error category, for callers that branch on the kind of failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Capacity,
    Insufficiency,
    Commit,
    Other,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn capacity_exceeded(
        container: impl Into<String>,
        capacity_gallons: f64,
        overage_gallons: f64,
    ) -> Self {
        Self::CapacityExceeded {
            container: container.into(),
            capacity_gallons,
            overage_gallons,
        }
    }

    pub fn insufficient(
        container: impl Into<String>,
        requested: f64,
        available: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self::Insufficient {
            container: container.into(),
            requested,
            available,
            shortfall: requested - available,
            unit: unit.into(),
        }
    }

    pub fn commit(msg: impl Into<String>) -> Self {
        Self::Commit(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Input,
            DomainError::CapacityExceeded { .. } => ErrorKind::Capacity,
            DomainError::Insufficient { .. } => ErrorKind::Insufficiency,
            DomainError::Commit(_) => ErrorKind::Commit,
            DomainError::InvalidId(_) | DomainError::Conflict(_) => ErrorKind::Other,
        }
    }

    /// Overage in gallons for capacity failures.
    pub fn overage(&self) -> Option<f64> {
        match self {
            DomainError::CapacityExceeded {
                overage_gallons, ..
            } => Some(*overage_gallons),
            _ => None,
        }
    }

    /// Shortfall (in the error's own unit) for insufficiency failures.
    pub fn shortfall(&self) -> Option<f64> {
        match self {
            DomainError::Insufficient { shortfall, .. } => Some(*shortfall),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_computes_shortfall() {
        let err = DomainError::insufficient("Barrel 7", 25.0, 20.0, "lbs");
        assert_eq!(err.kind(), ErrorKind::Insufficiency);
        assert_eq!(err.shortfall(), Some(5.0));
        assert!(err.to_string().contains("short by 5.00 lbs"));
    }

    #[test]
    fn commit_errors_are_prefixed() {
        let err = DomainError::commit("connection reset");
        assert_eq!(err.kind(), ErrorKind::Commit);
        assert_eq!(err.to_string(), "commit failed: connection reset");
    }

    #[test]
    fn capacity_message_reports_overage() {
        let err = DomainError::capacity_exceeded("Barrel 1", 53.0, 0.5);
        assert_eq!(err.overage(), Some(0.5));
        assert!(err.to_string().contains("over by 0.50 gal"));
    }
}
