//! Storage port: durable load/save of the bridge state.

use std::future::Future;

use lights_domain::error::BridgeError;
use lights_domain::state::BridgeState;

/// Loads and saves the authorized users and the registration table.
///
/// Last observed values are transient and must not be persisted.
pub trait StateStore {
    /// Read the persisted state.
    fn load(&self) -> impl Future<Output = Result<BridgeState, BridgeError>> + Send;

    /// Durably write `state`, replacing what was stored before.
    fn save(&self, state: &BridgeState) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: StateStore + Send + Sync> StateStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<BridgeState, BridgeError>> + Send {
        (**self).load()
    }

    fn save(&self, state: &BridgeState) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).save(state)
    }
}
