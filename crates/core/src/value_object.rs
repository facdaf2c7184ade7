//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Measurements, capacity snapshots and mutation payloads are all value
/// objects: they carry no identity of their own, are created per computation
/// and are compared by their attribute values. Two measurements with the same
/// fields are the same measurement.
///
/// Most value objects in this workspace hold `f64` quantities, so the bound is
/// `PartialEq` rather than `Eq`.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
