//! Container snapshots and rated capacities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stillgauge_core::{AggregateRoot, ContainerId, DomainError, DomainResult, ProductId, ValueObject};
use stillgauge_gauging::{Gauger, REFERENCE_TEMPERATURE_F, SpiritMeasurement, round2};

/// Float slack for capacity and sufficiency comparisons.
pub(crate) const EPSILON: f64 = 1e-9;

/// Declared container type; determines rated capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    WoodenBarrel,
    MetalDrum,
    SquareTank,
    Tote,
    FiveGallonTote,
    Still,
}

impl ContainerType {
    pub const ALL: [ContainerType; 6] = [
        ContainerType::WoodenBarrel,
        ContainerType::MetalDrum,
        ContainerType::SquareTank,
        ContainerType::Tote,
        ContainerType::FiveGallonTote,
        ContainerType::Still,
    ];

    /// Default rated capacity in wine gallons.
    pub fn default_capacity_gallons(self) -> f64 {
        match self {
            ContainerType::WoodenBarrel => 53.0,
            ContainerType::MetalDrum => 55.0,
            ContainerType::SquareTank => 100.0,
            ContainerType::Tote => 275.0,
            ContainerType::FiveGallonTote => 5.0,
            ContainerType::Still => 500.0,
        }
    }
}

/// Rated capacity (wine gallons) per container type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<ContainerType, f64>", into = "BTreeMap<ContainerType, f64>")]
pub struct CapacityTable {
    gallons: BTreeMap<ContainerType, f64>,
}

impl CapacityTable {
    /// Apply overrides on top of the defaults.
    pub fn with_overrides(overrides: impl IntoIterator<Item = (ContainerType, f64)>) -> DomainResult<Self> {
        let mut table = Self::default();
        for (container_type, gallons) in overrides {
            table.set(container_type, gallons)?;
        }
        Ok(table)
    }

    pub fn set(&mut self, container_type: ContainerType, gallons: f64) -> DomainResult<()> {
        if !(gallons.is_finite() && gallons > 0.0) {
            return Err(DomainError::validation(format!(
                "capacity for {container_type:?} must be a positive number of gallons"
            )));
        }
        self.gallons.insert(container_type, gallons);
        Ok(())
    }

    pub fn capacity(&self, container_type: ContainerType) -> f64 {
        self.gallons
            .get(&container_type)
            .copied()
            .unwrap_or_else(|| container_type.default_capacity_gallons())
    }
}

impl Default for CapacityTable {
    fn default() -> Self {
        Self {
            gallons: ContainerType::ALL
                .into_iter()
                .map(|t| (t, t.default_capacity_gallons()))
                .collect(),
        }
    }
}

impl TryFrom<BTreeMap<ContainerType, f64>> for CapacityTable {
    type Error = DomainError;

    fn try_from(overrides: BTreeMap<ContainerType, f64>) -> Result<Self, Self::Error> {
        Self::with_overrides(overrides)
    }
}

impl From<CapacityTable> for BTreeMap<ContainerType, f64> {
    fn from(table: CapacityTable) -> Self {
        table.gallons
    }
}

/// Snapshot of a container as read from persistence.
///
/// Validators receive one of these per operation and never re-read state, so
/// a snapshot is all an operation sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerState {
    id: ContainerId,
    name: String,
    container_type: ContainerType,
    product_id: Option<ProductId>,
    proof: f64,
    tare_weight_lbs: f64,
    net_weight_lbs: f64,
    version: u64,
}

impl ContainerState {
    /// An empty container.
    pub fn new(id: ContainerId, name: impl Into<String>, container_type: ContainerType) -> Self {
        Self {
            id,
            name: name.into(),
            container_type,
            product_id: None,
            proof: 0.0,
            tare_weight_lbs: 0.0,
            net_weight_lbs: 0.0,
            version: 0,
        }
    }

    pub fn with_contents(mut self, proof: f64, net_weight_lbs: f64) -> Self {
        self.proof = proof;
        self.net_weight_lbs = net_weight_lbs;
        self
    }

    pub fn with_tare(mut self, tare_weight_lbs: f64) -> Self {
        self.tare_weight_lbs = tare_weight_lbs;
        self
    }

    pub fn with_product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn id_typed(&self) -> ContainerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container_type(&self) -> ContainerType {
        self.container_type
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn proof(&self) -> f64 {
        self.proof
    }

    pub fn tare_weight_lbs(&self) -> f64 {
        self.tare_weight_lbs
    }

    pub fn net_weight_lbs(&self) -> f64 {
        self.net_weight_lbs
    }

    pub fn is_empty(&self) -> bool {
        self.net_weight_lbs <= 0.0
    }

    /// Full gauge of the current contents at the reference temperature.
    pub fn gauge(&self, gauger: &Gauger) -> SpiritMeasurement {
        gauger.from_weight(
            self.tare_weight_lbs,
            self.tare_weight_lbs + self.net_weight_lbs,
            self.proof,
            REFERENCE_TEMPERATURE_F,
        )
    }

    pub fn capacity_snapshot(&self, gauger: &Gauger, capacities: &CapacityTable) -> ContainerCapacitySnapshot {
        ContainerCapacitySnapshot::new(
            capacities.capacity(self.container_type),
            self.gauge(gauger).wine_gallons,
        )
    }
}

impl AggregateRoot for ContainerState {
    type Id = ContainerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Rated capacity versus current fill, in wine gallons.
///
/// `available_wine_gallons` can be negative when a container is already
/// overfilled; that is shown as a warning and never approves an addition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerCapacitySnapshot {
    pub capacity_gallons: f64,
    pub current_wine_gallons: f64,
    pub available_wine_gallons: f64,
}

impl ValueObject for ContainerCapacitySnapshot {}

impl ContainerCapacitySnapshot {
    pub fn new(capacity_gallons: f64, current_wine_gallons: f64) -> Self {
        Self {
            capacity_gallons,
            current_wine_gallons,
            available_wine_gallons: round2(capacity_gallons - current_wine_gallons),
        }
    }

    pub fn is_overfilled(&self) -> bool {
        self.available_wine_gallons < 0.0
    }

    /// Overage in gallons if `incoming` wine gallons were added, if any.
    pub fn overage_for(&self, incoming_wine_gallons: f64) -> Option<f64> {
        let predicted = self.current_wine_gallons + incoming_wine_gallons;
        if predicted > self.capacity_gallons + EPSILON {
            Some(round2(predicted - self.capacity_gallons))
        } else {
            None
        }
    }

    /// Fail with a capacity error naming `container` if the addition does not fit.
    pub fn ensure_room_for(&self, container: &str, incoming_wine_gallons: f64) -> DomainResult<()> {
        match self.overage_for(incoming_wine_gallons) {
            Some(overage) => Err(DomainError::capacity_exceeded(
                container,
                self.capacity_gallons,
                overage,
            )),
            None => Ok(()),
        }
    }
}
