//! Conversion core: net weight, wine gallons and proof gallons for a spirit
//! of a given proof and temperature.
//!
//! Everything here is pure. Reference data (density curve, temperature
//! correction grid) is loaded once, shared behind `Arc`, and injected through
//! [`Gauger`] so alternate tables can be substituted in tests or from files.

pub mod conversion;
pub mod correction;
pub mod density;
pub mod fill;
pub mod gauger;
pub mod input;
pub mod quantity;

pub use conversion::{SpiritMeasurement, round2};
pub use correction::{CorrectionEntry, TemperatureCorrectionTable};
pub use density::DensityTable;
pub use fill::{DrivingInput, FillForm};
pub use gauger::{Gauger, REFERENCE_TEMPERATURE_F};
pub use input::{
    check_proof, coerce, parse_non_negative, parse_positive, parse_positive_count, parse_proof,
    sanitize,
};
pub use quantity::{NormalizedQuantity, Quantity};
