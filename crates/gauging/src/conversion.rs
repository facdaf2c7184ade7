//! Bidirectional derivation between net weight, wine gallons and proof gallons.
//!
//! Each entry point takes exactly one driving quantity and derives the rest.
//! Raw inputs that are NaN, infinite or negative are treated as 0; nothing here
//! returns an error.

use serde::{Deserialize, Serialize};
use stillgauge_core::ValueObject;

use crate::gauger::{Gauger, REFERENCE_TEMPERATURE_F};
use crate::input::sanitize;

/// Round to two decimal places (half away from zero).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A fully derived gauge of a spirit in a container.
///
/// All quantities are rounded to two decimals, except density which keeps the
/// table's precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiritMeasurement {
    pub proof: f64,
    pub temperature_f: f64,
    pub tare_weight_lbs: f64,
    pub gross_weight_lbs: f64,
    pub net_weight_lbs: f64,
    pub wine_gallons: f64,
    pub proof_gallons: f64,
    /// lbs per wine gallon.
    pub spirit_density: f64,
}

impl ValueObject for SpiritMeasurement {}

impl SpiritMeasurement {
    /// An empty container: tare only, no spirit.
    pub fn empty(tare_weight_lbs: f64, proof: f64, temperature_f: f64, spirit_density: f64) -> Self {
        Self {
            proof,
            temperature_f,
            tare_weight_lbs: round2(tare_weight_lbs),
            gross_weight_lbs: round2(tare_weight_lbs),
            net_weight_lbs: 0.0,
            wine_gallons: 0.0,
            proof_gallons: 0.0,
            spirit_density,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.net_weight_lbs <= 0.0
    }
}

fn temperature_or_reference(temperature_f: f64) -> f64 {
    if temperature_f.is_finite() {
        temperature_f
    } else {
        REFERENCE_TEMPERATURE_F
    }
}

impl Gauger {
    /// Gauge by weight: `net = max(0, gross - tare)`.
    ///
    /// Proof gallons use the temperature-corrected proof like the volume
    /// entry points, rather than the raw `wine_gallons * proof / 100`; the two
    /// agree at 60°F.
    pub fn from_weight(
        &self,
        tare_weight_lbs: f64,
        gross_weight_lbs: f64,
        proof: f64,
        temperature_f: f64,
    ) -> SpiritMeasurement {
        let tare = sanitize(tare_weight_lbs);
        let gross = sanitize(gross_weight_lbs);
        let proof = sanitize(proof);
        let temperature = temperature_or_reference(temperature_f);

        let net = (gross - tare).max(0.0);
        let density = self.spirit_density(proof, REFERENCE_TEMPERATURE_F);
        let wine_gallons = if net > 0.0 { net / density } else { 0.0 };
        let proof_gallons = self.proof_gallons_ttb(wine_gallons, proof, temperature);

        SpiritMeasurement {
            proof,
            temperature_f: temperature,
            tare_weight_lbs: round2(tare),
            gross_weight_lbs: round2(tare + net),
            net_weight_lbs: round2(net),
            wine_gallons: round2(wine_gallons),
            proof_gallons: round2(proof_gallons),
            spirit_density: density,
        }
    }

    /// Gauge by volume.
    pub fn from_wine_gallons(
        &self,
        wine_gallons: f64,
        proof: f64,
        tare_weight_lbs: f64,
        temperature_f: f64,
    ) -> SpiritMeasurement {
        let wine_gallons = sanitize(wine_gallons);
        let proof = sanitize(proof);
        let tare = sanitize(tare_weight_lbs);
        let temperature = temperature_or_reference(temperature_f);

        let density = self.spirit_density(proof, temperature);
        let net = wine_gallons * density;
        let proof_gallons = self.proof_gallons_ttb(wine_gallons, proof, temperature);

        SpiritMeasurement {
            proof,
            temperature_f: temperature,
            tare_weight_lbs: round2(tare),
            gross_weight_lbs: round2(net + tare),
            net_weight_lbs: round2(net),
            wine_gallons: round2(wine_gallons),
            proof_gallons: round2(proof_gallons),
            spirit_density: density,
        }
    }

    /// Gauge by taxable quantity.
    ///
    /// Zero proof or zero proof gallons yield an empty measurement.
    pub fn from_proof_gallons(
        &self,
        proof_gallons: f64,
        proof: f64,
        tare_weight_lbs: f64,
        temperature_f: f64,
    ) -> SpiritMeasurement {
        let proof_gallons = sanitize(proof_gallons);
        let proof = sanitize(proof);
        let tare = sanitize(tare_weight_lbs);
        let temperature = temperature_or_reference(temperature_f);

        let true_proof = self.true_proof(proof, temperature);
        let wine_gallons = if proof > 0.0 && proof_gallons > 0.0 && true_proof > 0.0 {
            proof_gallons / (true_proof / 100.0)
        } else {
            0.0
        };
        let density = self.spirit_density(proof, temperature);
        let net = wine_gallons * density;
        let proof_gallons = self.proof_gallons_ttb(wine_gallons, proof, temperature);

        SpiritMeasurement {
            proof,
            temperature_f: temperature,
            tare_weight_lbs: round2(tare),
            gross_weight_lbs: round2(net + tare),
            net_weight_lbs: round2(net),
            wine_gallons: round2(wine_gallons),
            proof_gallons: round2(proof_gallons),
            spirit_density: density,
        }
    }

    /// Wine gallons and proof gallons held by `net_weight_lbs` of spirit at 60°F.
    pub fn gallons_from_weight(&self, proof: f64, net_weight_lbs: f64) -> (f64, f64) {
        let gauge = self.from_weight(0.0, net_weight_lbs, proof, REFERENCE_TEMPERATURE_F);
        (gauge.wine_gallons, gauge.proof_gallons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gauger() -> Gauger {
        Gauger::representative()
    }

    #[test]
    fn weight_round_trips_through_wine_gallons() {
        let g = gauger();
        let by_weight = g.from_weight(50.0, 350.0, 80.0, 60.0);
        assert_eq!(by_weight.net_weight_lbs, 300.0);

        let by_volume = g.from_wine_gallons(by_weight.wine_gallons, 80.0, 50.0, 60.0);
        assert!((by_volume.net_weight_lbs - by_weight.net_weight_lbs).abs() <= 0.05);
        assert!((by_volume.gross_weight_lbs - 350.0).abs() <= 0.05);
    }

    #[test]
    fn weight_gauge_corrects_proof_gallons_for_temperature() {
        let g = gauger();
        let at_reference = g.from_weight(0.0, 776.02, 100.0, 60.0);
        assert_eq!(at_reference.wine_gallons, 100.0);
        assert_eq!(at_reference.proof_gallons, 100.0);

        let warm = g.from_weight(0.0, 776.02, 100.0, 70.0);
        assert_eq!(warm.wine_gallons, 100.0);
        assert_eq!(warm.spirit_density, at_reference.spirit_density);
        assert_eq!(warm.proof_gallons, 96.6);
    }

    #[test]
    fn gross_below_tare_yields_zero_net() {
        let g = gauger();
        let gauge = g.from_weight(120.0, 100.0, 100.0, 60.0);
        assert_eq!(gauge.net_weight_lbs, 0.0);
        assert_eq!(gauge.wine_gallons, 0.0);
        assert_eq!(gauge.proof_gallons, 0.0);
        assert_eq!(gauge.gross_weight_lbs, 120.0);
    }

    #[test]
    fn bad_raw_inputs_coerce_to_zero() {
        let g = gauger();
        let gauge = g.from_wine_gallons(f64::NAN, -40.0, -5.0, 60.0);
        assert_eq!(gauge.wine_gallons, 0.0);
        assert_eq!(gauge.proof, 0.0);
        assert_eq!(gauge.tare_weight_lbs, 0.0);
        assert_eq!(gauge.spirit_density, g.density_table().water());
    }

    #[test]
    fn proof_gallons_drive_wine_gallons() {
        let g = gauger();
        let gauge = g.from_proof_gallons(50.0, 100.0, 10.0, 60.0);
        assert_eq!(gauge.wine_gallons, 50.0);
        assert_eq!(gauge.proof_gallons, 50.0);
        assert_eq!(gauge.net_weight_lbs, round2(50.0 * 7.7602));
        assert_eq!(gauge.gross_weight_lbs, round2(50.0 * 7.7602 + 10.0));
    }

    #[test]
    fn zero_proof_gives_no_volume_from_proof_gallons() {
        let g = gauger();
        let gauge = g.from_proof_gallons(50.0, 0.0, 10.0, 60.0);
        assert_eq!(gauge.wine_gallons, 0.0);
        assert_eq!(gauge.proof_gallons, 0.0);
        assert_eq!(gauge.gross_weight_lbs, 10.0);
    }

    #[test]
    fn warm_sample_is_corrected_in_every_direction() {
        let g = gauger();
        // 100 proof observed at 70°F is 96.6 true proof.
        let by_volume = g.from_wine_gallons(10.0, 100.0, 0.0, 70.0);
        assert_eq!(by_volume.proof_gallons, 9.66);

        let by_weight = g.from_weight(0.0, by_volume.net_weight_lbs, 100.0, 70.0);
        assert_eq!(by_weight.wine_gallons, 10.0);
        assert_eq!(by_weight.proof_gallons, 9.66);

        let by_pg = g.from_proof_gallons(9.66, 100.0, 0.0, 70.0);
        assert_eq!(by_pg.wine_gallons, 10.0);
    }

    #[test]
    fn gallons_from_weight_matches_from_weight() {
        let g = gauger();
        let (wg, pg) = g.gallons_from_weight(130.0, 400.0);
        let gauge = g.from_weight(0.0, 400.0, 130.0, 60.0);
        assert_eq!(wg, gauge.wine_gallons);
        assert_eq!(pg, gauge.proof_gallons);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the measurement invariants hold for any weight-driven gauge.
        #[test]
        fn weight_gauge_invariants(
            tare in 0.0f64..500.0,
            net in 0.0f64..5_000.0,
            proof in 0.0f64..200.0,
        ) {
            let g = gauger();
            let m = g.from_weight(tare, tare + net, proof, 60.0);
            prop_assert!(m.net_weight_lbs >= 0.0);
            prop_assert!((m.proof_gallons - m.wine_gallons * proof / 100.0).abs() <= 0.02);
            prop_assert!((m.wine_gallons * m.spirit_density - m.net_weight_lbs).abs() <= 0.1);
        }

        /// Property: identical inputs give bit-identical outputs.
        #[test]
        fn conversions_are_deterministic(wg in 0.0f64..1_000.0, proof in 0.0f64..200.0) {
            let g = gauger();
            let a = g.from_wine_gallons(wg, proof, 25.0, 60.0);
            let b = g.from_wine_gallons(wg, proof, 25.0, 60.0);
            prop_assert_eq!(a, b);
        }
    }
}
