//! Container fill form: one driving input, two derived outputs.

use serde::{Deserialize, Serialize};

use crate::conversion::SpiritMeasurement;
use crate::gauger::{Gauger, REFERENCE_TEMPERATURE_F};
use crate::input::{coerce, sanitize};

/// Which quantity the operator is typing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrivingInput {
    #[default]
    NetWeight,
    WineGallons,
    ProofGallons,
}

/// State machine behind the fill form.
///
/// Exactly one quantity drives; the other two, density and gross weight are
/// derived and read-only. Any change to the driving value, proof, tare or
/// temperature recomputes the derived measurement immediately, so
/// [`FillForm::measurement`] is never stale.
#[derive(Debug, Clone)]
pub struct FillForm {
    gauger: Gauger,
    mode: DrivingInput,
    driving_value: f64,
    proof: f64,
    tare_weight_lbs: f64,
    temperature_f: f64,
    derived: SpiritMeasurement,
}

impl FillForm {
    pub fn new(gauger: Gauger) -> Self {
        let density = gauger.spirit_density(0.0, REFERENCE_TEMPERATURE_F);
        Self {
            gauger,
            mode: DrivingInput::default(),
            driving_value: 0.0,
            proof: 0.0,
            tare_weight_lbs: 0.0,
            temperature_f: REFERENCE_TEMPERATURE_F,
            derived: SpiritMeasurement::empty(0.0, 0.0, REFERENCE_TEMPERATURE_F, density),
        }
    }

    pub fn mode(&self) -> DrivingInput {
        self.mode
    }

    pub fn driving_value(&self) -> f64 {
        self.driving_value
    }

    pub fn measurement(&self) -> &SpiritMeasurement {
        &self.derived
    }

    /// Switch the driving input.
    ///
    /// The newly driving field keeps the value it currently displays, so
    /// switching modes alone never changes the measurement beyond rounding.
    pub fn set_mode(&mut self, mode: DrivingInput) {
        if mode == self.mode {
            return;
        }
        self.driving_value = match mode {
            DrivingInput::NetWeight => self.derived.net_weight_lbs,
            DrivingInput::WineGallons => self.derived.wine_gallons,
            DrivingInput::ProofGallons => self.derived.proof_gallons,
        };
        self.mode = mode;
        self.recompute();
    }

    pub fn set_value(&mut self, value: f64) {
        self.driving_value = sanitize(value);
        self.recompute();
    }

    /// Set the driving value from a text field; unparseable text counts as 0.
    pub fn set_value_raw(&mut self, raw: &str) {
        self.set_value(coerce(raw));
    }

    pub fn set_proof(&mut self, proof: f64) {
        self.proof = sanitize(proof);
        self.recompute();
    }

    pub fn set_tare(&mut self, tare_weight_lbs: f64) {
        self.tare_weight_lbs = sanitize(tare_weight_lbs);
        self.recompute();
    }

    pub fn set_temperature(&mut self, temperature_f: f64) {
        self.temperature_f = if temperature_f.is_finite() {
            temperature_f
        } else {
            REFERENCE_TEMPERATURE_F
        };
        self.recompute();
    }

    fn recompute(&mut self) {
        let g = &self.gauger;
        self.derived = match self.mode {
            DrivingInput::NetWeight => g.from_weight(
                self.tare_weight_lbs,
                self.tare_weight_lbs + self.driving_value,
                self.proof,
                self.temperature_f,
            ),
            DrivingInput::WineGallons => g.from_wine_gallons(
                self.driving_value,
                self.proof,
                self.tare_weight_lbs,
                self.temperature_f,
            ),
            DrivingInput::ProofGallons => g.from_proof_gallons(
                self.driving_value,
                self.proof,
                self.tare_weight_lbs,
                self.temperature_f,
            ),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FillForm {
        FillForm::new(Gauger::representative())
    }

    #[test]
    fn weight_drives_gallons() {
        let mut f = form();
        f.set_proof(100.0);
        f.set_tare(50.0);
        f.set_value(77.602);
        let m = f.measurement();
        assert_eq!(m.wine_gallons, 10.0);
        assert_eq!(m.proof_gallons, 10.0);
        assert_eq!(m.gross_weight_lbs, 127.6);
    }

    #[test]
    fn proof_change_recomputes_derived_outputs() {
        let mut f = form();
        f.set_mode(DrivingInput::WineGallons);
        f.set_value(10.0);
        f.set_proof(100.0);
        assert_eq!(f.measurement().proof_gallons, 10.0);

        f.set_proof(80.0);
        assert_eq!(f.measurement().wine_gallons, 10.0);
        assert_eq!(f.measurement().proof_gallons, 8.0);
        assert_eq!(f.measurement().net_weight_lbs, 79.1);
    }

    #[test]
    fn tare_change_moves_gross_but_not_net() {
        let mut f = form();
        f.set_proof(80.0);
        f.set_value(300.0);
        f.set_tare(40.0);
        assert_eq!(f.measurement().net_weight_lbs, 300.0);
        assert_eq!(f.measurement().gross_weight_lbs, 340.0);
    }

    #[test]
    fn switching_mode_keeps_displayed_value() {
        let mut f = form();
        f.set_proof(100.0);
        f.set_mode(DrivingInput::ProofGallons);
        f.set_value(20.0);
        let before = *f.measurement();

        f.set_mode(DrivingInput::WineGallons);
        assert_eq!(f.driving_value(), before.wine_gallons);
        assert_eq!(f.measurement().wine_gallons, before.wine_gallons);
        assert_eq!(f.measurement().proof_gallons, before.proof_gallons);
    }

    #[test]
    fn garbage_text_counts_as_zero() {
        let mut f = form();
        f.set_proof(100.0);
        f.set_value_raw("twelve");
        assert!(f.measurement().is_empty());
    }
}
