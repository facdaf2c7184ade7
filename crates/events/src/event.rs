use chrono::{DateTime, Utc};

use stillgauge_core::{ContainerId, TransactionId};

/// A recorded fact about a container.
///
/// Every committed inventory operation yields exactly one event. Events are
/// never edited after they are appended; schema changes bump `version`.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable name, e.g. "inventory.container.transferred".
    fn event_type(&self) -> &'static str;

    fn version(&self) -> u32;

    /// Identifier of the transaction this event records.
    fn transaction_id(&self) -> TransactionId;

    /// Primary container (the source, for transfers).
    fn container_id(&self) -> ContainerId;

    /// Second container, when the operation involved two.
    fn counterparty_id(&self) -> Option<ContainerId> {
        None
    }

    /// Business time of the operation.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Whether this event changed `container`.
    fn touches(&self, container: ContainerId) -> bool {
        self.container_id() == container || self.counterparty_id() == Some(container)
    }
}
