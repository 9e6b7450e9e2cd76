//! # lights-domain
//!
//! Pure domain model for the lights-telegram bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers and error conventions
//! - Define **Registrations** (a chat verb bound to a bus topic and the values it accepts)
//! - Define the **authorized user set** (the admin plus approved users)
//! - Define the **bridge state** (both of the above, the unit that gets persisted)
//! - Parse **chat commands** into verbs and arguments
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod command;
pub mod registration;
pub mod state;
pub mod users;
