//! MQTT connection configuration, read from the `[mqtt]` config section.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the MQTT bus connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker URL, e.g. `mqtt://host:1883` or `wss://host:443/mqtt`.
    pub url: String,
    /// Broker user name. Empty disables authentication.
    pub username: String,
    /// Broker password.
    pub password: String,
    /// MQTT client identifier.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// How long a publish/subscribe/unsubscribe may take, in seconds.
    pub request_timeout_secs: u16,
    /// Publish device commands as retained messages.
    pub retain: bool,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            url: "mqtt://localhost:1883".to_string(),
            username: String::new(),
            password: String::new(),
            client_id: "lights-telegram".to_string(),
            keep_alive_secs: 30,
            request_timeout_secs: 10,
            retain: true,
        }
    }
}

impl MqttConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.request_timeout_secs))
    }

    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(u64::from(self.keep_alive_secs))
    }
}
