use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stillgauge_core::{AggregateRoot, ContainerId};
use stillgauge_events::{AuditEntry, Event};

use crate::commit::{ApiError, InventoryApi};
use crate::container::ContainerState;
use crate::request::OperationRequest;

#[derive(Debug, Default)]
struct State {
    versions: HashMap<ContainerId, u64>,
    requests: Vec<OperationRequest>,
    audit: Vec<AuditEntry>,
    fail_next_apply: Option<ApiError>,
    fail_next_audit: Option<ApiError>,
}

/// In-memory persistence API.
///
/// Intended for tests/dev. Tracks container versions (each applied mutation
/// advances every touched container by one) and rejects stale payloads.
#[derive(Debug, Default)]
pub struct InMemoryInventoryApi {
    state: RwLock<State>,
}

impl InMemoryInventoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a container at its snapshot version.
    pub fn register(&self, container: &ContainerState) {
        if let Ok(mut state) = self.state.write() {
            state.versions.insert(container.id_typed(), container.version());
        }
    }

    pub fn version_of(&self, id: ContainerId) -> u64 {
        self.state
            .read()
            .map(|s| s.versions.get(&id).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn requests(&self) -> Vec<OperationRequest> {
        self.state.read().map(|s| s.requests.clone()).unwrap_or_default()
    }

    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.state.read().map(|s| s.audit.clone()).unwrap_or_default()
    }

    /// Audit entries involving `container`, as source or destination, oldest first.
    pub fn history_of(&self, container: ContainerId) -> Vec<AuditEntry> {
        self.state
            .read()
            .map(|s| s.audit.iter().filter(|e| e.touches(container)).cloned().collect())
            .unwrap_or_default()
    }

    /// Make the next `apply` call fail with `error`.
    pub fn fail_next_apply(&self, error: ApiError) {
        if let Ok(mut state) = self.state.write() {
            state.fail_next_apply = Some(error);
        }
    }

    /// Make the next `append_audit` call fail with `error`.
    pub fn fail_next_audit(&self, error: ApiError) {
        if let Ok(mut state) = self.state.write() {
            state.fail_next_audit = Some(error);
        }
    }
}

#[async_trait]
impl InventoryApi for InMemoryInventoryApi {
    async fn apply(&self, request: &OperationRequest) -> Result<(), ApiError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| ApiError::Unavailable("lock poisoned".to_string()))?;

        if let Some(error) = state.fail_next_apply.take() {
            return Err(error);
        }

        let touched = request.touched();
        for (id, expected) in &touched {
            let current = state.versions.get(id).copied().unwrap_or(0);
            expected
                .check(current)
                .map_err(|err| ApiError::Conflict(format!("container {id}: {err}")))?;
        }
        for (id, _) in touched {
            *state.versions.entry(id).or_insert(0) += 1;
        }

        state.requests.push(request.clone());
        Ok(())
    }

    async fn append_audit(&self, entry: &AuditEntry) -> Result<(), ApiError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| ApiError::Unavailable("lock poisoned".to_string()))?;

        if let Some(error) = state.fail_next_audit.take() {
            return Err(error);
        }
        state.audit.push(entry.clone());
        Ok(())
    }
}
