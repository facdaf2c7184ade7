//! Amounts expressed in one of the three gauging units.

use serde::{Deserialize, Serialize};
use stillgauge_core::{DomainError, DomainResult, ValueObject};

use crate::gauger::Gauger;

/// An amount of spirit in the unit the operator entered it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Quantity {
    /// Net weight in lbs.
    Weight(f64),
    WineGallons(f64),
    ProofGallons(f64),
}

impl Quantity {
    pub fn value(&self) -> f64 {
        match self {
            Quantity::Weight(v) | Quantity::WineGallons(v) | Quantity::ProofGallons(v) => *v,
        }
    }

    pub fn unit_label(&self) -> &'static str {
        match self {
            Quantity::Weight(_) => "lbs",
            Quantity::WineGallons(_) => "wine gallons",
            Quantity::ProofGallons(_) => "proof gallons",
        }
    }

    /// Operation amounts must be finite and strictly positive.
    pub fn ensure_positive(&self) -> DomainResult<()> {
        let value = self.value();
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "amount in {} must be greater than 0",
                self.unit_label()
            )))
        }
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2} {}", self.value(), self.unit_label())
    }
}

/// The same amount expressed in all three units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuantity {
    pub weight_lbs: f64,
    pub wine_gallons: f64,
    pub proof_gallons: f64,
}

impl ValueObject for NormalizedQuantity {}

impl Gauger {
    /// Express `quantity` of a spirit at `proof` in every unit (rounded to 2 places).
    pub fn normalize(&self, quantity: Quantity, proof: f64, temperature_f: f64) -> NormalizedQuantity {
        let gauge = match quantity {
            Quantity::Weight(lbs) => self.from_weight(0.0, lbs, proof, temperature_f),
            Quantity::WineGallons(wg) => self.from_wine_gallons(wg, proof, 0.0, temperature_f),
            Quantity::ProofGallons(pg) => self.from_proof_gallons(pg, proof, 0.0, temperature_f),
        };
        NormalizedQuantity {
            weight_lbs: gauge.net_weight_lbs,
            wine_gallons: gauge.wine_gallons,
            proof_gallons: gauge.proof_gallons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_each_unit() {
        let g = Gauger::representative();

        let by_volume = g.normalize(Quantity::WineGallons(10.0), 100.0, 60.0);
        assert_eq!(by_volume.wine_gallons, 10.0);
        assert_eq!(by_volume.proof_gallons, 10.0);
        assert_eq!(by_volume.weight_lbs, 77.6);

        let by_weight = g.normalize(Quantity::Weight(77.6), 100.0, 60.0);
        assert_eq!(by_weight.wine_gallons, 10.0);

        let by_pg = g.normalize(Quantity::ProofGallons(5.0), 100.0, 60.0);
        assert_eq!(by_pg.wine_gallons, 5.0);
    }

    #[test]
    fn non_positive_amounts_are_input_errors() {
        assert!(Quantity::Weight(0.0).ensure_positive().is_err());
        assert!(Quantity::WineGallons(-1.0).ensure_positive().is_err());
        assert!(Quantity::ProofGallons(f64::NAN).ensure_positive().is_err());
        assert!(Quantity::ProofGallons(0.5).ensure_positive().is_ok());
    }

    #[test]
    fn display_names_the_unit() {
        assert_eq!(Quantity::Weight(25.0).to_string(), "25.00 lbs");
    }
}
