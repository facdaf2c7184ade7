use std::sync::Arc;

use stillgauge_core::{ContainerId, DomainError, DomainResult};
use stillgauge_gauging::Gauger;

use crate::container::{CapacityTable, ContainerState};

/// Operation validators over shared reference data.
///
/// Stateless: every method takes the container snapshots it needs and returns
/// either a plan ready to commit or a rejection. Nothing is mutated here.
#[derive(Debug, Clone)]
pub struct InventoryEngine {
    gauger: Gauger,
    capacities: Arc<CapacityTable>,
}

impl InventoryEngine {
    pub fn new(gauger: Gauger, capacities: Arc<CapacityTable>) -> Self {
        Self { gauger, capacities }
    }

    pub fn gauger(&self) -> &Gauger {
        &self.gauger
    }

    pub fn capacities(&self) -> &CapacityTable {
        &self.capacities
    }

    pub(crate) fn ensure_container_id(
        &self,
        container: &ContainerState,
        expected: ContainerId,
    ) -> DomainResult<()> {
        if container.id_typed() != expected {
            return Err(DomainError::validation(format!(
                "container_id mismatch: command targets {expected}, snapshot is {}",
                container.id_typed()
            )));
        }
        Ok(())
    }
}

impl Default for InventoryEngine {
    fn default() -> Self {
        Self::new(Gauger::representative(), Arc::new(CapacityTable::default()))
    }
}
