//! Registry: use-cases over the device registration table.

use std::sync::Arc;

use lights_domain::error::BridgeError;
use lights_domain::registration::Registration;

use crate::ports::StateStore;
use crate::state::{Mutation, SharedState};

/// Bus subscription change the caller must apply after a registry mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum TopicChange {
    Subscribe(String),
    Unsubscribe(String),
    /// The topic is still used by another registration.
    Keep,
}

/// Application service owning all registration lookups and mutations.
pub struct Registry<S> {
    shared: Arc<SharedState<S>>,
}

impl<S> Clone for Registry<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: StateStore> Registry<S> {
    /// Create a registry over the shared state.
    pub fn new(shared: Arc<SharedState<S>>) -> Self {
        Self { shared }
    }

    /// Register a new device and persist the table.
    ///
    /// On success the caller must subscribe the returned topic.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] for an invalid name or topic,
    /// [`BridgeError::AlreadyExists`] if `name` is taken, or
    /// [`BridgeError::Persistence`] if the save failed (the registration is
    /// kept in memory).
    #[tracing::instrument(skip(self, values))]
    pub async fn register(
        &self,
        name: &str,
        topic: &str,
        values: Vec<String>,
    ) -> Result<TopicChange, BridgeError> {
        let registration = Registration::builder()
            .name(name)
            .topic(topic)
            .values(values)
            .build()?;
        let change = self
            .shared
            .update(move |state| {
                let topic = registration.topic.clone();
                state.insert(registration)?;
                Ok(Mutation::Changed(TopicChange::Subscribe(topic)))
            })
            .await?;
        tracing::info!("device registered");
        Ok(change)
    }

    /// Remove a device and persist the table.
    ///
    /// On success the caller must apply the returned change; the topic is
    /// only released when no other registration still uses it.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] if `name` is not registered, or
    /// [`BridgeError::Persistence`] if the save failed.
    #[tracing::instrument(skip(self))]
    pub async fn unregister(&self, name: &str) -> Result<TopicChange, BridgeError> {
        let change = self
            .shared
            .update(|state| {
                let removed = state.remove(name)?;
                let change = if state.is_topic_in_use(&removed.topic) {
                    TopicChange::Keep
                } else {
                    TopicChange::Unsubscribe(removed.topic)
                };
                Ok(Mutation::Changed(change))
            })
            .await?;
        tracing::info!("device unregistered");
        Ok(change)
    }

    /// Look up a registration by its exact name.
    pub async fn find_by_name(&self, name: &str) -> Option<Registration> {
        self.shared.read(|state| state.find(name).cloned()).await
    }

    /// Whether `name` is registered and accepts `value`.
    pub async fn is_valid_value(&self, name: &str, value: &str) -> bool {
        self.shared
            .read(|state| state.find(name).is_some_and(|reg| reg.accepts(value)))
            .await
    }

    /// Record `value` as last seen on `topic`. Unknown topics are ignored.
    pub async fn record_observed_value(&self, topic: &str, value: &str) {
        let matched = self
            .shared
            .touch(|state| state.record_observed(topic, value))
            .await;
        if matched == 0 {
            tracing::debug!(topic, "no registration for topic");
        }
    }

    /// Snapshot of all registrations, in registration order.
    pub async fn describe_all(&self) -> Vec<Registration> {
        self.shared
            .read(|state| state.registrations().to_vec())
            .await
    }

    /// Distinct topics that must be subscribed on the bus.
    pub async fn topics(&self) -> Vec<String> {
        self.shared.read(lights_domain::state::BridgeState::topics).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::InMemoryStore;
    use lights_domain::state::BridgeState;

    fn make_registry() -> (Registry<Arc<InMemoryStore>>, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::default());
        let shared = SharedState::new(BridgeState::default(), Arc::clone(&store));
        (Registry::new(Arc::new(shared)), store)
    }

    fn on_off() -> Vec<String> {
        vec!["on".to_string(), "off".to_string()]
    }

    #[tokio::test]
    async fn should_register_and_request_subscription() {
        let (registry, store) = make_registry();
        let change = registry.register("lamp", "home/lamp", on_off()).await.unwrap();
        assert_eq!(change, TopicChange::Subscribe("home/lamp".to_string()));

        let reg = registry.find_by_name("lamp").await.unwrap();
        assert_eq!(reg.topic, "home/lamp");
        assert!(reg.last_value.is_none());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn should_reject_second_register_and_keep_first() {
        let (registry, store) = make_registry();
        registry.register("lamp", "home/lamp", on_off()).await.unwrap();

        let result = registry.register("lamp", "home/other", vec![]).await;
        assert!(matches!(result, Err(BridgeError::AlreadyExists(_))));

        let reg = registry.find_by_name("lamp").await.unwrap();
        assert_eq!(reg.topic, "home/lamp");
        assert_eq!(reg.values, on_off());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn should_reject_invalid_registration_without_saving() {
        let (registry, store) = make_registry();
        let result = registry.register("help", "home/help", vec![]).await;
        assert!(matches!(result, Err(BridgeError::Validation(_))));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn should_report_not_found_on_second_unregister() {
        let (registry, _) = make_registry();
        registry.register("lamp", "home/lamp", on_off()).await.unwrap();

        let change = registry.unregister("lamp").await.unwrap();
        assert_eq!(change, TopicChange::Unsubscribe("home/lamp".to_string()));

        let result = registry.unregister("lamp").await;
        assert!(matches!(result, Err(BridgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_keep_topic_shared_with_other_registration() {
        let (registry, _) = make_registry();
        registry.register("lamp", "home/light", on_off()).await.unwrap();
        registry.register("light", "home/light", on_off()).await.unwrap();

        let change = registry.unregister("lamp").await.unwrap();
        assert_eq!(change, TopicChange::Keep);
        assert_eq!(registry.topics().await, vec!["home/light"]);
    }

    #[tokio::test]
    async fn should_validate_values() {
        let (registry, _) = make_registry();
        registry.register("lamp", "home/lamp", on_off()).await.unwrap();
        registry.register("display", "home/display", vec![]).await.unwrap();

        assert!(registry.is_valid_value("lamp", "on").await);
        assert!(!registry.is_valid_value("lamp", "blink").await);
        assert!(!registry.is_valid_value("fan", "on").await);
        for value in ["anything", "", "with spaces"] {
            assert!(registry.is_valid_value("display", value).await);
        }
    }

    #[tokio::test]
    async fn should_record_observed_value_without_saving() {
        let (registry, store) = make_registry();
        registry.register("lamp", "home/lamp", on_off()).await.unwrap();

        registry.record_observed_value("home/lamp", "off").await;
        registry.record_observed_value("home/lamp", "on").await;
        registry.record_observed_value("garage/door", "open").await;

        let reg = registry.find_by_name("lamp").await.unwrap();
        assert_eq!(reg.last_value.as_deref(), Some("on"));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn should_describe_registrations_in_order() {
        let (registry, _) = make_registry();
        registry.register("lamp", "home/lamp", on_off()).await.unwrap();
        registry.register("fan", "home/fan", vec![]).await.unwrap();

        let names: Vec<_> = registry
            .describe_all()
            .await
            .into_iter()
            .map(|reg| reg.name)
            .collect();
        assert_eq!(names, vec!["lamp", "fan"]);
    }

    #[tokio::test]
    async fn should_keep_registration_in_memory_when_save_fails() {
        let store = Arc::new(InMemoryStore::failing());
        let shared = SharedState::new(BridgeState::default(), Arc::clone(&store));
        let registry = Registry::new(Arc::new(shared));

        let result = registry.register("lamp", "home/lamp", on_off()).await;
        assert!(matches!(result, Err(BridgeError::Persistence(_))));
        assert!(registry.find_by_name("lamp").await.is_some());
    }
}
