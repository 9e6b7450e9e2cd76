//! # lights-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `StateStore`: load & save users and registrations
//!   - `BusTransport`: publish, subscribe, unsubscribe on the message bus
//!   - `ChatTransport`: replies and notifications to chat users
//! - Define the inbound `BusListener` port the bus adapter feeds
//! - Provide the use-case services:
//!   - `Registry`: register, unregister, look up devices, record observed values
//!   - `AuthorizationGate`: admin / authorized checks, approve users
//!   - `CommandRouter`: parse and execute chat commands
//!   - `StateReconciler`: apply inbound bus messages
//! - Own the single lock around the shared bridge state
//!
//! ## Dependency rule
//! Depends on `lights-domain` only (plus `tokio::sync` for the state lock).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod state;
