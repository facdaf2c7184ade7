//! Temperature correction of observed proof.
//!
//! The grid covers even degrees 60–80°F and proofs 80–170 in steps of 5. It is
//! an approximation of the regulatory gauging tables, not a complete copy:
//! lookups outside the grid return no correction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stillgauge_core::{DomainError, DomainResult};

const GRID_PROOFS: [i32; 19] = [
    80, 85, 90, 95, 100, 105, 110, 115, 120, 125, 130, 135, 140, 145, 150, 155, 160, 165, 170,
];

#[rustfmt::skip]
const GRID_ROWS: [(i32, [f64; 19]); 11] = [
    (60, [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    (62, [-0.6, -0.6, -0.7, -0.7, -0.7, -0.7, -0.7, -0.6, -0.6, -0.6, -0.6, -0.6, -0.6, -0.6, -0.6, -0.5, -0.5, -0.5, -0.5]),
    (64, [-1.2, -1.3, -1.3, -1.3, -1.4, -1.3, -1.3, -1.3, -1.3, -1.2, -1.2, -1.2, -1.2, -1.1, -1.1, -1.1, -1.1, -1.0, -1.0]),
    (66, [-1.9, -1.9, -2.0, -2.0, -2.0, -2.0, -2.0, -1.9, -1.9, -1.9, -1.8, -1.8, -1.8, -1.7, -1.7, -1.6, -1.6, -1.6, -1.5]),
    (68, [-2.5, -2.5, -2.6, -2.7, -2.7, -2.7, -2.6, -2.6, -2.5, -2.5, -2.4, -2.4, -2.3, -2.3, -2.2, -2.2, -2.1, -2.1, -2.0]),
    (70, [-3.1, -3.2, -3.2, -3.3, -3.4, -3.3, -3.3, -3.2, -3.2, -3.1, -3.0, -3.0, -2.9, -2.9, -2.8, -2.7, -2.7, -2.6, -2.6]),
    (72, [-3.7, -3.8, -3.9, -4.0, -4.1, -4.0, -3.9, -3.9, -3.8, -3.7, -3.6, -3.6, -3.5, -3.4, -3.4, -3.3, -3.2, -3.1, -3.1]),
    (74, [-4.3, -4.4, -4.5, -4.7, -4.8, -4.7, -4.6, -4.5, -4.4, -4.3, -4.3, -4.2, -4.1, -4.0, -3.9, -3.8, -3.8, -3.7, -3.6]),
    (76, [-5.0, -5.1, -5.2, -5.3, -5.4, -5.3, -5.2, -5.2, -5.1, -5.0, -4.9, -4.8, -4.7, -4.6, -4.5, -4.4, -4.3, -4.2, -4.1]),
    (78, [-5.6, -5.7, -5.9, -6.0, -6.1, -6.0, -5.9, -5.8, -5.7, -5.6, -5.5, -5.4, -5.3, -5.1, -5.0, -4.9, -4.8, -4.7, -4.6]),
    (80, [-6.2, -6.3, -6.5, -6.7, -6.8, -6.7, -6.6, -6.4, -6.3, -6.2, -6.1, -6.0, -5.8, -5.7, -5.6, -5.5, -5.4, -5.2, -5.1]),
];

/// One cell of the correction grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEntry {
    pub temperature_f: i32,
    pub proof: i32,
    /// Added to the observed proof to obtain true proof.
    pub correction: f64,
}

/// Additive proof corrections keyed by (temperature bucket, proof bucket).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CorrectionEntry>", into = "Vec<CorrectionEntry>")]
pub struct TemperatureCorrectionTable {
    cells: BTreeMap<(i32, i32), f64>,
}

impl TemperatureCorrectionTable {
    /// The compiled-in representative grid.
    pub fn representative() -> Self {
        let cells = GRID_ROWS
            .iter()
            .flat_map(|(temperature, row)| {
                GRID_PROOFS
                    .iter()
                    .zip(row.iter())
                    .map(move |(proof, correction)| ((*temperature, *proof), *correction))
            })
            .collect();
        Self { cells }
    }

    /// A table with no cells; every lookup yields 0.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CorrectionEntry>) -> DomainResult<Self> {
        let mut cells = BTreeMap::new();
        for entry in entries {
            if !entry.correction.is_finite() {
                return Err(DomainError::validation(format!(
                    "correction at {}°F / {} proof must be finite",
                    entry.temperature_f, entry.proof
                )));
            }
            if cells
                .insert((entry.temperature_f, entry.proof), entry.correction)
                .is_some()
            {
                return Err(DomainError::validation(format!(
                    "duplicate correction at {}°F / {} proof",
                    entry.temperature_f, entry.proof
                )));
            }
        }
        Ok(Self { cells })
    }

    /// Parse a JSON array of `{temperature_f, proof, correction}` objects.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("correction table: {e}")))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Correction for an observed proof at a temperature.
    ///
    /// Temperature rounds to the nearest even degree and proof to the nearest
    /// multiple of 5. A missing cell is not an error: it means no correction.
    pub fn correction(&self, temperature_f: f64, observed_proof: f64) -> f64 {
        if !(temperature_f.is_finite() && observed_proof.is_finite()) {
            return 0.0;
        }
        let temperature_key = ((temperature_f / 2.0).round() * 2.0) as i32;
        let proof_key = ((observed_proof / 5.0).round() * 5.0) as i32;
        self.cells
            .get(&(temperature_key, proof_key))
            .copied()
            .unwrap_or(0.0)
    }
}

impl TryFrom<Vec<CorrectionEntry>> for TemperatureCorrectionTable {
    type Error = DomainError;

    fn try_from(entries: Vec<CorrectionEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<TemperatureCorrectionTable> for Vec<CorrectionEntry> {
    fn from(table: TemperatureCorrectionTable) -> Self {
        table
            .cells
            .into_iter()
            .map(|((temperature_f, proof), correction)| CorrectionEntry {
                temperature_f,
                proof,
                correction,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn representative_grid_is_complete() {
        let table = TemperatureCorrectionTable::representative();
        assert_eq!(table.len(), 11 * 19);
    }

    #[test]
    fn rounds_to_nearest_even_degree_and_five_proof() {
        let table = TemperatureCorrectionTable::representative();
        assert_eq!(table.correction(70.0, 100.0), -3.4);
        // 69.2°F -> 70, 101.9 proof -> 100
        assert_eq!(table.correction(69.2, 101.9), -3.4);
        // 71.2°F -> 72, 103 proof -> 105
        assert_eq!(table.correction(71.2, 103.0), -4.0);
    }

    #[test]
    fn outside_grid_means_no_correction() {
        let table = TemperatureCorrectionTable::representative();
        assert_eq!(table.correction(90.0, 100.0), 0.0);
        assert_eq!(table.correction(70.0, 40.0), 0.0);
        assert_eq!(table.correction(f64::NAN, 100.0), 0.0);
        assert_eq!(TemperatureCorrectionTable::empty().correction(70.0, 100.0), 0.0);
    }

    #[test]
    fn duplicate_cells_are_rejected() {
        let cell = CorrectionEntry {
            temperature_f: 70,
            proof: 100,
            correction: -3.0,
        };
        let err = TemperatureCorrectionTable::from_entries([cell, cell]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn loads_alternate_table_from_json() {
        let json = r#"[{"temperature_f": 70, "proof": 100, "correction": -2.5}]"#;
        let table = TemperatureCorrectionTable::from_json(json).unwrap();
        assert_eq!(table.correction(70.0, 100.0), -2.5);
        assert_eq!(table.correction(72.0, 100.0), 0.0);
    }
}
