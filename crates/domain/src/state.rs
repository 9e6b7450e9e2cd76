//! Bridge state: the registration table plus the authorized users.
//!
//! This is the single piece of mutable state the bridge owns. It is loaded
//! from the persistence layer at startup, mutated in place by the registry
//! and the authorization gate, and saved back after every mutation.
//!
//! Registrations are kept in a plain ordered list. Every lookup is a linear
//! scan, which is fine for the handful of devices a household registers; an
//! index by name and by topic would be the next step if that ever grows.

use crate::error::{AlreadyExistsError, NotFoundError};
use crate::registration::Registration;
use crate::users::AuthorizedUsers;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeState {
    pub users: AuthorizedUsers,
    registrations: Vec<Registration>,
}

impl BridgeState {
    /// Assemble a state from persisted parts.
    ///
    /// Later registrations reusing an earlier name are dropped so the name
    /// stays unique even when the file was edited by hand.
    #[must_use]
    pub fn new(users: AuthorizedUsers, registrations: impl IntoIterator<Item = Registration>) -> Self {
        let mut state = Self {
            users,
            registrations: Vec::new(),
        };
        for registration in registrations {
            // Duplicate names in a hand-edited file: first one wins.
            let _ = state.insert(registration);
        }
        state
    }

    /// All registrations in registration order.
    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Registration> {
        self.registrations.iter().find(|reg| reg.name == name)
    }

    /// Append a registration.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyExistsError`] if the name is taken; the existing
    /// registration is left untouched.
    pub fn insert(&mut self, registration: Registration) -> Result<(), AlreadyExistsError> {
        if self.find(&registration.name).is_some() {
            return Err(AlreadyExistsError {
                name: registration.name,
            });
        }
        self.registrations.push(registration);
        Ok(())
    }

    /// Remove and return the registration called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if no registration has that name.
    pub fn remove(&mut self, name: &str) -> Result<Registration, NotFoundError> {
        let index = self
            .registrations
            .iter()
            .position(|reg| reg.name == name)
            .ok_or_else(|| NotFoundError {
                name: name.to_string(),
            })?;
        Ok(self.registrations.remove(index))
    }

    /// Store `value` as the last observed value of every registration on
    /// `topic`. Returns how many registrations matched.
    pub fn record_observed(&mut self, topic: &str, value: &str) -> usize {
        let mut matched = 0;
        for reg in self.registrations.iter_mut().filter(|reg| reg.listens_on(topic)) {
            reg.last_value = Some(value.to_string());
            matched += 1;
        }
        matched
    }

    /// Distinct topics of all registrations, in registration order.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = Vec::with_capacity(self.registrations.len());
        for reg in &self.registrations {
            if !topics.contains(&reg.topic) {
                topics.push(reg.topic.clone());
            }
        }
        topics
    }

    /// Whether any registration listens on `topic`.
    #[must_use]
    pub fn is_topic_in_use(&self, topic: &str) -> bool {
        self.registrations.iter().any(|reg| reg.listens_on(topic))
    }
}
