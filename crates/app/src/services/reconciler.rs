//! State reconciler: folds inbound bus messages into the registry.

use crate::ports::{BusListener, StateStore};
use crate::services::registry::Registry;

/// Updates last observed values from bus traffic. Never replies.
///
/// Same-topic messages are applied in delivery order, last write wins.
pub struct StateReconciler<S> {
    registry: Registry<S>,
}

impl<S> Clone for StateReconciler<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<S: StateStore> StateReconciler<S> {
    pub fn new(registry: Registry<S>) -> Self {
        Self { registry }
    }

    /// Record `payload` as the current value of every device on `topic`.
    pub async fn on_bus_message(&self, topic: &str, payload: &[u8]) {
        let value = String::from_utf8_lossy(payload);
        tracing::info!(topic, value = %value, "bus rx");
        self.registry.record_observed_value(topic, &value).await;
    }
}

impl<S> BusListener for StateReconciler<S>
where
    S: StateStore + Send + Sync,
{
    async fn on_message(&self, topic: &str, payload: &[u8]) {
        self.on_bus_message(topic, payload).await;
    }

    async fn topics(&self) -> Vec<String> {
        self.registry.topics().await
    }
}
