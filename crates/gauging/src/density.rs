//! Spirit density by proof at the 60°F reference temperature.

use serde::{Deserialize, Serialize};
use stillgauge_core::{DomainError, DomainResult};

/// Number of tabulated integer proofs (0 through 200 inclusive).
pub const DENSITY_TABLE_LEN: usize = 201;

/// Representative weight per wine gallon (lbs) at 60°F, indexed by integer proof.
///
/// Index 0 is water, index 200 is absolute ethanol. Swap in the official table
/// through [`DensityTable::from_values`] or [`DensityTable::from_json`].
#[rustfmt::skip]
const REPRESENTATIVE_LBS_PER_GALLON: [f64; DENSITY_TABLE_LEN] = [
    8.32823, 8.3222, 8.3162, 8.3102, 8.3042, 8.2981, 8.2921, 8.2861, 8.2801, 8.2741,  // 0
    8.2682, 8.2622, 8.2561, 8.2501, 8.2440, 8.2380, 8.2320, 8.2261, 8.2203, 8.2145,  // 10
    8.2089, 8.2034, 8.1981, 8.1928, 8.1875, 8.1824, 8.1772, 8.1722, 8.1671, 8.1621,  // 20
    8.1571, 8.1521, 8.1472, 8.1423, 8.1375, 8.1327, 8.1279, 8.1231, 8.1184, 8.1136,  // 30
    8.1089, 8.1042, 8.0996, 8.0950, 8.0904, 8.0858, 8.0812, 8.0766, 8.0720, 8.0673,  // 40
    8.0626, 8.0578, 8.0529, 8.0480, 8.0431, 8.0381, 8.0331, 8.0281, 8.0232, 8.0182,  // 50
    8.0133, 8.0084, 8.0036, 7.9988, 7.9940, 7.9893, 7.9844, 7.9796, 7.9747, 7.9697,  // 60
    7.9646, 7.9594, 7.9542, 7.9490, 7.9438, 7.9384, 7.9330, 7.9274, 7.9216, 7.9157,  // 70
    7.9096, 7.9032, 7.8964, 7.8895, 7.8823, 7.8749, 7.8675, 7.8599, 7.8523, 7.8448,  // 80
    7.8372, 7.8298, 7.8223, 7.8147, 7.8071, 7.7994, 7.7917, 7.7839, 7.7761, 7.7682,  // 90
    7.7602, 7.7521, 7.7439, 7.7356, 7.7273, 7.7189, 7.7104, 7.7019, 7.6933, 7.6846,  // 100
    7.6759, 7.6671, 7.6582, 7.6493, 7.6403, 7.6312, 7.6221, 7.6129, 7.6036, 7.5943,  // 110
    7.5850, 7.5757, 7.5663, 7.5568, 7.5473, 7.5377, 7.5281, 7.5185, 7.5087, 7.4990,  // 120
    7.4892, 7.4793, 7.4694, 7.4594, 7.4494, 7.4394, 7.4292, 7.4191, 7.4088, 7.3986,  // 130
    7.3882, 7.3778, 7.3674, 7.3569, 7.3463, 7.3357, 7.3250, 7.3143, 7.3035, 7.2926,  // 140
    7.2817, 7.2707, 7.2597, 7.2486, 7.2374, 7.2262, 7.2149, 7.2035, 7.1921, 7.1805,  // 150
    7.1689, 7.1572, 7.1454, 7.1335, 7.1215, 7.1094, 7.0973, 7.0850, 7.0727, 7.0603,  // 160
    7.0478, 7.0353, 7.0227, 7.0101, 6.9973, 6.9845, 6.9715, 6.9584, 6.9451, 6.9316,  // 170
    6.9178, 6.9039, 6.8899, 6.8758, 6.8614, 6.8468, 6.8320, 6.8169, 6.8014, 6.7856,  // 180
    6.7693, 6.7525, 6.7350, 6.7169, 6.6983, 6.6795, 6.6604, 6.6413, 6.6222, 6.6033,  // 190
    6.5846,                                                                          // 200
];

/// Ordered mapping from integer proof (0–200) to lbs per wine gallon at 60°F.
///
/// Immutable once built. Entries must be positive, finite and non-increasing
/// in proof (alcohol is lighter than water).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct DensityTable {
    lbs_per_gallon: Vec<f64>,
}

impl DensityTable {
    /// The compiled-in representative curve.
    pub fn representative() -> Self {
        Self {
            lbs_per_gallon: REPRESENTATIVE_LBS_PER_GALLON.to_vec(),
        }
    }

    /// Build a table from 201 values, one per integer proof.
    pub fn from_values(values: Vec<f64>) -> DomainResult<Self> {
        if values.len() != DENSITY_TABLE_LEN {
            return Err(DomainError::validation(format!(
                "density table must have {DENSITY_TABLE_LEN} entries (proof 0-200), got {}",
                values.len()
            )));
        }
        for (proof, value) in values.iter().enumerate() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(DomainError::validation(format!(
                    "density at proof {proof} must be a finite positive number"
                )));
            }
        }
        if let Some(proof) = values.windows(2).position(|w| w[1] > w[0]) {
            return Err(DomainError::validation(format!(
                "density must not increase with proof (proof {} -> {})",
                proof,
                proof + 1
            )));
        }
        Ok(Self {
            lbs_per_gallon: values,
        })
    }

    /// Parse a JSON array of 201 numbers.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("density table: {e}")))
    }

    /// Density of water (proof 0).
    pub fn water(&self) -> f64 {
        self.lbs_per_gallon[0]
    }

    /// Density of absolute ethanol (proof 200).
    pub fn ethanol(&self) -> f64 {
        self.lbs_per_gallon[DENSITY_TABLE_LEN - 1]
    }

    /// Exact tabulated value for an integer proof.
    pub fn exact(&self, proof: u32) -> Option<f64> {
        self.lbs_per_gallon.get(proof as usize).copied()
    }

    /// Density at an arbitrary proof on the reference curve.
    ///
    /// Non-finite and negative proofs are treated as 0. Integer proofs return the
    /// tabulated constant; fractional proofs interpolate linearly between the
    /// neighbouring entries. Anything past the table falls back to a linear
    /// volumetric mix of water and ethanol.
    pub fn lookup(&self, proof: f64) -> f64 {
        let proof = if proof.is_finite() { proof.max(0.0) } else { 0.0 };
        if proof == 0.0 {
            return self.water();
        }

        let max_proof = (DENSITY_TABLE_LEN - 1) as f64;
        if proof > max_proof {
            return self.mixture(proof);
        }

        let floor = proof.floor();
        let lower = self.lbs_per_gallon[floor as usize];
        if proof == floor {
            return lower;
        }
        let upper = self.lbs_per_gallon[floor as usize + 1];
        lower + (upper - lower) * (proof - floor)
    }

    fn mixture(&self, proof: f64) -> f64 {
        let ethanol_fraction = proof / 200.0;
        ethanol_fraction * self.ethanol() + (1.0 - ethanol_fraction) * self.water()
    }
}

impl Default for DensityTable {
    fn default() -> Self {
        Self::representative()
    }
}

impl TryFrom<Vec<f64>> for DensityTable {
    type Error = DomainError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_values(values)
    }
}

impl From<DensityTable> for Vec<f64> {
    fn from(table: DensityTable) -> Self {
        table.lbs_per_gallon
    }
}
