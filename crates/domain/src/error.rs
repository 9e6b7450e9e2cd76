//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BridgeError`]
//! at port boundaries. Domain failures render as the user-visible text that
//! ends up in chat replies.

use std::error::Error as StdError;

/// Boxed source error used by the transport and persistence variants.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Top-level error for every operation of the bridge core.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A domain invariant was violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested registration does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// A registration with the same name already exists.
    #[error(transparent)]
    AlreadyExists(#[from] AlreadyExistsError),

    /// A chat or bus call failed.
    #[error("transport error")]
    Transport(#[source] BoxError),

    /// The durable write of the state failed.
    #[error("failed to save state")]
    Persistence(#[source] BoxError),
}

/// Invariant violations on registrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("name must not contain {0:?}")]
    InvalidNameCharacter(char),

    #[error("name \"{0}\" is a built-in command")]
    ReservedName(String),

    #[error("topic must not be empty")]
    EmptyTopic,
}

/// Lookup of a registration by name failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("name not found")]
pub struct NotFoundError {
    pub name: String,
}

/// Insert of a registration collided with an existing name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("already registered")]
pub struct AlreadyExistsError {
    pub name: String,
}

impl BridgeError {
    /// Wrap any error as a [`BridgeError::Transport`].
    pub fn transport(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }

    /// Wrap any error as a [`BridgeError::Persistence`].
    pub fn persistence(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Persistence(Box::new(err))
    }
}
