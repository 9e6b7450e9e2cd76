//! Shared bridge state: the one lock guarding registrations and users.
//!
//! Both event streams (chat and bus) go through this type. Every mutation
//! that changes persisted data is saved while the lock is still held, so no
//! reader ever sees an in-memory state that was not at least handed to the
//! store. A failed save is logged and reported, but the in-memory change is
//! kept: memory and disk stay divergent until the next successful save.

use tokio::sync::Mutex;

use lights_domain::error::BridgeError;
use lights_domain::state::BridgeState;

use crate::ports::StateStore;

/// Outcome of a state mutation closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<T> {
    /// Persisted data changed and must be saved.
    Changed(T),
    /// Nothing to save.
    Unchanged(T),
}

/// The bridge state behind a single mutex, with its backing store.
pub struct SharedState<S> {
    state: Mutex<BridgeState>,
    store: S,
}

impl<S: StateStore> SharedState<S> {
    /// Wrap an already loaded state.
    pub fn new(state: BridgeState, store: S) -> Self {
        Self {
            state: Mutex::new(state),
            store,
        }
    }

    /// Load the state from `store` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Persistence`] if the store cannot be read.
    pub async fn load(store: S) -> Result<Self, BridgeError> {
        let state = store.load().await?;
        Ok(Self::new(state, store))
    }

    /// Run `f` against the current state.
    pub async fn read<T>(&self, f: impl FnOnce(&BridgeState) -> T) -> T {
        let state = self.state.lock().await;
        f(&state)
    }

    /// Run `f` against the state without persisting anything.
    ///
    /// Only for transient data such as last observed values.
    pub async fn touch<T>(&self, f: impl FnOnce(&mut BridgeState) -> T) -> T {
        let mut state = self.state.lock().await;
        f(&mut state)
    }

    /// Run `f` against the state and save it if `f` reports a change.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `f` (nothing is saved then), or
    /// returns [`BridgeError::Persistence`] when the save fails. In the
    /// latter case the in-memory change is kept.
    pub async fn update<T>(
        &self,
        f: impl FnOnce(&mut BridgeState) -> Result<Mutation<T>, BridgeError>,
    ) -> Result<T, BridgeError> {
        let mut state = self.state.lock().await;
        match f(&mut state)? {
            Mutation::Unchanged(value) => Ok(value),
            Mutation::Changed(value) => {
                if let Err(err) = self.store.save(&state).await {
                    tracing::error!(error = %err, "state changed in memory but could not be saved");
                    return Err(err);
                }
                Ok(value)
            }
        }
    }
}
