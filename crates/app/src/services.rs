//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.
//! The registry, the gate and the reconciler share one [`SharedState`](crate::state::SharedState).

pub mod auth_gate;
pub mod reconciler;
pub mod registry;
pub mod router;
