//! Shared handle over the reference tables.

use std::sync::Arc;

use crate::correction::TemperatureCorrectionTable;
use crate::density::DensityTable;

/// Reference temperature of the density curve.
pub const REFERENCE_TEMPERATURE_F: f64 = 60.0;

/// Entry point of the conversion core.
///
/// Holds the density curve and the temperature correction grid behind `Arc`,
/// so cloning is cheap and every caller sees the same immutable data. Build it
/// once at process start and pass it down.
#[derive(Debug, Clone)]
pub struct Gauger {
    density: Arc<DensityTable>,
    corrections: Arc<TemperatureCorrectionTable>,
}

impl Gauger {
    pub fn new(density: Arc<DensityTable>, corrections: Arc<TemperatureCorrectionTable>) -> Self {
        tracing::debug!(
            water_lbs_per_gal = density.water(),
            ethanol_lbs_per_gal = density.ethanol(),
            correction_cells = corrections.len(),
            "gauging tables installed"
        );
        Self {
            density,
            corrections,
        }
    }

    /// Gauger over the compiled-in representative tables.
    pub fn representative() -> Self {
        Self::new(
            Arc::new(DensityTable::representative()),
            Arc::new(TemperatureCorrectionTable::representative()),
        )
    }

    pub fn density_table(&self) -> &DensityTable {
        &self.density
    }

    pub fn correction_table(&self) -> &TemperatureCorrectionTable {
        &self.corrections
    }

    /// Weight per wine gallon (lbs) for a spirit of `proof`.
    ///
    /// Always read from the 60°F reference curve; proof is assumed to be
    /// temperature-corrected already. `_temperature_f` is accepted so callers
    /// can pass what they measured without branching.
    pub fn spirit_density(&self, proof: f64, _temperature_f: f64) -> f64 {
        self.density.lookup(proof)
    }

    /// Additive correction for an observed proof at `temperature_f`.
    pub fn temperature_correction(&self, temperature_f: f64, observed_proof: f64) -> f64 {
        self.corrections.correction(temperature_f, observed_proof)
    }

    /// Observed proof corrected to 60°F. Never negative.
    pub fn true_proof(&self, observed_proof: f64, temperature_f: f64) -> f64 {
        (observed_proof + self.temperature_correction(temperature_f, observed_proof)).max(0.0)
    }

    /// Proof gallons from wine gallons using the temperature-corrected proof.
    pub fn proof_gallons_ttb(&self, wine_gallons: f64, observed_proof: f64, temperature_f: f64) -> f64 {
        wine_gallons * self.true_proof(observed_proof, temperature_f) / 100.0
    }
}

impl Default for Gauger {
    fn default() -> Self {
        Self::representative()
    }
}
