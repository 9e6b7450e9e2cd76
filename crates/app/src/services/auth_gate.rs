//! Authorization gate: who may issue commands and who may administer.
//!
//! Identities move one way only: unknown → authorized. There is no revoke.

use std::sync::Arc;

use lights_domain::error::BridgeError;
use lights_domain::id::UserId;

use crate::ports::StateStore;
use crate::state::{Mutation, SharedState};

pub struct AuthorizationGate<S> {
    shared: Arc<SharedState<S>>,
}

impl<S> Clone for AuthorizationGate<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: StateStore> AuthorizationGate<S> {
    pub fn new(shared: Arc<SharedState<S>>) -> Self {
        Self { shared }
    }

    /// The configured admin, or `None` while the config still carries the
    /// placeholder id.
    pub async fn admin(&self) -> Option<UserId> {
        self.shared
            .read(|state| state.users.has_admin().then(|| state.users.admin()))
            .await
    }

    pub async fn is_admin(&self, id: UserId) -> bool {
        self.shared.read(|state| state.users.is_admin(id)).await
    }

    pub async fn is_authorized(&self, id: UserId) -> bool {
        self.shared.read(|state| state.users.is_authorized(id)).await
    }

    /// Approve `id`. Idempotent: the admin and already approved users are
    /// accepted without touching the store.
    ///
    /// Returns whether `id` was newly added.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Persistence`] if the save failed; `id` stays
    /// authorized in memory.
    #[tracing::instrument(skip(self))]
    pub async fn authorize(&self, id: UserId) -> Result<bool, BridgeError> {
        let added = self
            .shared
            .update(|state| {
                if state.users.insert(id) {
                    Ok(Mutation::Changed(true))
                } else {
                    Ok(Mutation::Unchanged(false))
                }
            })
            .await?;
        if added {
            tracing::info!("user authorized");
        }
        Ok(added)
    }
}
