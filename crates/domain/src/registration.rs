//! Registration: a named device bound to a bus topic.

use serde::{Deserialize, Serialize};

use crate::command::BUILTIN_VERBS;
use crate::error::{BridgeError, ValidationError};

/// A controllable device: chat verb, bus topic and the values it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Unique, case-sensitive command verb.
    pub name: String,
    /// Bus topic the device listens and reports on.
    pub topic: String,
    /// Accepted command values, in display order. Empty means freeform.
    #[serde(default)]
    pub values: Vec<String>,
    /// Most recent payload observed on `topic`. Never persisted.
    #[serde(skip)]
    pub last_value: Option<String>,
}

impl Registration {
    /// Create a builder for constructing a [`Registration`].
    #[must_use]
    pub fn builder() -> RegistrationBuilder {
        RegistrationBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] when the name is empty, contains
    /// whitespace, `/` or `@`, or shadows a built-in verb, and when the topic
    /// is empty.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if let Some(c) = self
            .name
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '/' | '@'))
        {
            return Err(ValidationError::InvalidNameCharacter(c).into());
        }
        if BUILTIN_VERBS.contains(&self.name.as_str()) {
            return Err(ValidationError::ReservedName(self.name.clone()).into());
        }
        if self.topic.is_empty() {
            return Err(ValidationError::EmptyTopic.into());
        }
        Ok(())
    }

    /// Whether `value` may be published for this device.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        self.values.is_empty() || self.values.iter().any(|allowed| allowed == value)
    }

    /// Whether this registration's topic matches an inbound topic exactly.
    #[must_use]
    pub fn listens_on(&self, topic: &str) -> bool {
        self.topic == topic
    }
}

/// Split a comma separated value list as typed in a `register` command.
///
/// Whitespace around commas is kept verbatim. An empty list means the device
/// accepts any value.
#[must_use]
pub fn parse_values(list: &str) -> Vec<String> {
    if list.is_empty() {
        return Vec::new();
    }
    list.split(',').map(str::to_string).collect()
}

/// Step-by-step builder for [`Registration`].
#[derive(Debug, Default)]
pub struct RegistrationBuilder {
    name: Option<String>,
    topic: Option<String>,
    values: Vec<String>,
}

impl RegistrationBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    #[must_use]
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Consume the builder, validate, and return a [`Registration`].
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] if the name or topic is invalid.
    pub fn build(self) -> Result<Registration, BridgeError> {
        let registration = Registration {
            name: self.name.unwrap_or_default(),
            topic: self.topic.unwrap_or_default(),
            values: self.values,
            last_value: None,
        };
        registration.validate()?;
        Ok(registration)
    }
}
