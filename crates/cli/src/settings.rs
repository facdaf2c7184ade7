//! Settings for the `stillgauge` binary.
//!
//! Read from an optional `stillgauge.toml` (any format `config` understands),
//! then overlaid by `STILLGAUGE_*` environment variables. Nested keys use a
//! double underscore: `STILLGAUGE_CAPACITIES__TOTE=300`.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use stillgauge_gauging::{DensityTable, Gauger, TemperatureCorrectionTable};
use stillgauge_inventory::{CapacityTable, ContainerType, InventoryEngine};
use stillgauge_observability::{LogFormat, LogSettings};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `EnvFilter` directives; falls back to `RUST_LOG`, then `info`.
    pub log_filter: Option<String>,
    pub log_json: bool,
    /// JSON array of 201 lbs-per-gallon values, proof 0 through 200.
    pub density_table_path: Option<PathBuf>,
    /// JSON array of `{temperature_f, proof, correction}` cells.
    pub correction_table_path: Option<PathBuf>,
    /// Rated capacity overrides, wine gallons per container type.
    pub capacities: BTreeMap<ContainerType, f64>,
}

impl Settings {
    pub fn load(name: &str) -> Result<Self, ConfigError> {
        Self::from_builder(Config::builder().add_source(File::with_name(name).required(false)))
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .add_source(
                Environment::with_prefix("STILLGAUGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            filter: self.log_filter.clone(),
            format: if self.log_json { LogFormat::Json } else { LogFormat::Pretty },
        }
    }

    /// Gauger over the configured tables, or the compiled-in ones.
    pub fn gauger(&self) -> anyhow::Result<Gauger> {
        let density = match &self.density_table_path {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading density table {}", path.display()))?;
                let table = DensityTable::from_json(&json)
                    .with_context(|| format!("loading density table {}", path.display()))?;
                tracing::info!(path = %path.display(), "density table loaded");
                table
            }
            None => DensityTable::representative(),
        };

        let corrections = match &self.correction_table_path {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading correction table {}", path.display()))?;
                let table = TemperatureCorrectionTable::from_json(&json)
                    .with_context(|| format!("loading correction table {}", path.display()))?;
                tracing::info!(path = %path.display(), cells = table.len(), "correction table loaded");
                table
            }
            None => TemperatureCorrectionTable::representative(),
        };

        Ok(Gauger::new(Arc::new(density), Arc::new(corrections)))
    }

    pub fn capacity_table(&self) -> anyhow::Result<CapacityTable> {
        CapacityTable::with_overrides(self.capacities.iter().map(|(t, g)| (*t, *g)))
            .context("invalid capacity override")
    }

    pub fn engine(&self) -> anyhow::Result<InventoryEngine> {
        Ok(InventoryEngine::new(self.gauger()?, Arc::new(self.capacity_table()?)))
    }
}
