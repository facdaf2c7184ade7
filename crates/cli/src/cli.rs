//! Command-line surface over the gauging core and the operation validators.

use std::fmt::Write as _;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};

use stillgauge_core::ContainerId;
use stillgauge_gauging::{REFERENCE_TEMPERATURE_F, check_proof};
use stillgauge_inventory::{
    BOTTLES_PER_CASE, ContainerState, ContainerType, InventoryEngine, ProofDown, max_bottles,
};

#[derive(Debug, Parser)]
#[command(name = "stillgauge", version)]
#[command(about = "Spirits gauging: weight, wine gallons and proof gallons")]
pub struct Cli {
    /// Settings file name, extension optional; a missing file is ignored
    #[arg(long, global = true, default_value = "stillgauge")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Weight per wine gallon (lbs) at a proof
    Density {
        #[arg(long)]
        proof: f64,
    },

    /// Temperature correction and true proof for a hydrometer reading
    Correction {
        /// Observed temperature (°F)
        #[arg(long, allow_negative_numbers = true)]
        temperature: f64,

        /// Observed proof
        #[arg(long)]
        proof: f64,
    },

    /// Derive a full gauge from one driving quantity
    Gauge(GaugeArgs),

    /// Plan a dilution of a container to a lower proof
    ProofDown(ProofDownArgs),

    /// Whole bottles that fit in a volume
    Bottles {
        /// Available wine gallons
        #[arg(long)]
        wine_gallons: f64,

        /// Bottle size (mL)
        #[arg(long, default_value_t = 750)]
        size_ml: u32,
    },
}

#[derive(Debug, Args)]
pub struct GaugeArgs {
    #[arg(long)]
    pub proof: f64,

    /// Container tare weight (lbs)
    #[arg(long, default_value_t = 0.0)]
    pub tare: f64,

    /// Temperature (°F)
    #[arg(long, default_value_t = REFERENCE_TEMPERATURE_F, allow_negative_numbers = true)]
    pub temperature: f64,

    #[command(flatten)]
    pub driving: DrivingArgs,
}

/// Exactly one driving quantity.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct DrivingArgs {
    /// Gross weight (lbs), container included
    #[arg(long)]
    pub weight: Option<f64>,

    #[arg(long)]
    pub wine_gallons: Option<f64>,

    #[arg(long)]
    pub proof_gallons: Option<f64>,
}

#[derive(Debug, Args)]
pub struct ProofDownArgs {
    #[arg(long, value_enum)]
    pub container_type: ContainerKind,

    #[arg(long, default_value = "container")]
    pub name: String,

    /// Current proof
    #[arg(long)]
    pub proof: f64,

    /// Current net spirit weight (lbs)
    #[arg(long)]
    pub net_weight: f64,

    #[arg(long, default_value_t = 0.0)]
    pub tare: f64,

    #[arg(long)]
    pub target: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContainerKind {
    WoodenBarrel,
    MetalDrum,
    SquareTank,
    Tote,
    FiveGallonTote,
    Still,
}

impl From<ContainerKind> for ContainerType {
    fn from(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::WoodenBarrel => ContainerType::WoodenBarrel,
            ContainerKind::MetalDrum => ContainerType::MetalDrum,
            ContainerKind::SquareTank => ContainerType::SquareTank,
            ContainerKind::Tote => ContainerType::Tote,
            ContainerKind::FiveGallonTote => ContainerType::FiveGallonTote,
            ContainerKind::Still => ContainerType::Still,
        }
    }
}

/// Run one command and render its output.
pub fn run(command: Command, engine: &InventoryEngine) -> anyhow::Result<String> {
    let gauger = engine.gauger();
    match command {
        Command::Density { proof } => {
            let proof = check_proof("proof", proof)?;
            Ok(format!("{:.4} lbs/gal", gauger.spirit_density(proof, REFERENCE_TEMPERATURE_F)))
        }

        Command::Correction { temperature, proof } => {
            let proof = check_proof("proof", proof)?;
            let correction = gauger.temperature_correction(temperature, proof);
            let true_proof = gauger.true_proof(proof, temperature);
            Ok(format!("correction {correction:+.1}, true proof {true_proof:.1}"))
        }

        Command::Gauge(args) => {
            let proof = check_proof("proof", args.proof)?;
            let measurement = match args.driving {
                DrivingArgs { weight: Some(gross), .. } => {
                    gauger.from_weight(args.tare, gross, proof, args.temperature)
                }
                DrivingArgs {
                    wine_gallons: Some(wg),
                    ..
                } => gauger.from_wine_gallons(wg, proof, args.tare, args.temperature),
                DrivingArgs {
                    proof_gallons: Some(pg),
                    ..
                } => gauger.from_proof_gallons(pg, proof, args.tare, args.temperature),
                _ => bail!("one of --weight, --wine-gallons or --proof-gallons is required"),
            };
            serde_json::to_string_pretty(&measurement).context("rendering measurement")
        }

        Command::ProofDown(args) => {
            let container = ContainerState::new(ContainerId::new(), args.name, args.container_type.into())
                .with_tare(args.tare)
                .with_contents(check_proof("proof", args.proof)?, args.net_weight);
            let plan = engine.proof_down(
                &container,
                &ProofDown {
                    container_id: container.id_typed(),
                    target_proof: args.target,
                    occurred_at: Utc::now(),
                },
            )?;
            let mut out = serde_json::to_string_pretty(&plan.payload).context("rendering proof-down plan")?;
            let _ = write!(out, "\n{}", plan.audit.notes);
            Ok(out)
        }

        Command::Bottles { wine_gallons, size_ml } => {
            if size_ml == 0 {
                bail!("bottle size must be greater than 0 mL");
            }
            let bottles = max_bottles(wine_gallons, size_ml);
            Ok(format!(
                "{bottles} x {size_ml} mL ({} cases + {} loose)",
                bottles / BOTTLES_PER_CASE,
                bottles % BOTTLES_PER_CASE
            ))
        }
    }
}
