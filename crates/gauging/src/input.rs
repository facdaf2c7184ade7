//! Raw field handling.
//!
//! Two policies live side by side: the conversion core *coerces* bad input to
//! zero and never fails, while operation validators *parse* and reject bad
//! input before anything is computed.

use stillgauge_core::{DomainError, DomainResult};

/// Clamp a numeric input: NaN, infinities and negatives become 0.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Coerce a raw text field to a non-negative number, 0 when it does not parse.
pub fn coerce(raw: &str) -> f64 {
    raw.trim().parse::<f64>().map(sanitize).unwrap_or(0.0)
}

fn parse_number(field: &str, raw: &str) -> DomainResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| DomainError::validation(format!("{field} must be a number")))?;
    if !value.is_finite() {
        return Err(DomainError::validation(format!("{field} must be a finite number")));
    }
    Ok(value)
}

/// Parse a strictly positive amount.
pub fn parse_positive(field: &str, raw: &str) -> DomainResult<f64> {
    let value = parse_number(field, raw)?;
    if value <= 0.0 {
        return Err(DomainError::validation(format!("{field} must be greater than 0")));
    }
    Ok(value)
}

/// Parse an amount that may be zero.
pub fn parse_non_negative(field: &str, raw: &str) -> DomainResult<f64> {
    let value = parse_number(field, raw)?;
    if value < 0.0 {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(value)
}

/// Parse a positive whole count (bottles, cases).
pub fn parse_positive_count(field: &str, raw: &str) -> DomainResult<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    let count = trimmed
        .parse::<u32>()
        .map_err(|_| DomainError::validation(format!("{field} must be a whole number")))?;
    if count == 0 {
        return Err(DomainError::validation(format!("{field} must be at least 1")));
    }
    Ok(count)
}

/// Parse a proof in 0–200.
pub fn parse_proof(field: &str, raw: &str) -> DomainResult<f64> {
    let value = parse_number(field, raw)?;
    check_proof(field, value)
}

/// Range-check an already numeric proof.
pub fn check_proof(field: &str, proof: f64) -> DomainResult<f64> {
    if !(0.0..=200.0).contains(&proof) {
        return Err(DomainError::validation(format!("{field} must be between 0 and 200")));
    }
    Ok(proof)
}
