//! [`BusTransport`] implementation backed by a rumqttc client.

use std::future::Future;
use std::time::Duration;

use rumqttc::{AsyncClient, ClientError, EventLoop, QoS};

use lights_app::ports::BusTransport;
use lights_domain::error::BridgeError;

use crate::broker::mqtt_options;
use crate::config::MqttConfig;
use crate::error::MqttError;

/// Number of requests buffered between the client and the event loop.
const REQUEST_CAPACITY: usize = 64;

/// Outbound side of the MQTT connection.
///
/// Requests are queued to the [`EventLoop`] returned by [`MqttBus::new`];
/// nothing goes over the wire until that loop is driven.
#[derive(Clone)]
pub struct MqttBus {
    client: AsyncClient,
    request_timeout: Duration,
    retain: bool,
}

impl MqttBus {
    /// Create the client and its event loop from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::InvalidUrl`] if the broker URL cannot be parsed.
    pub fn new(config: &MqttConfig) -> Result<(Self, EventLoop), MqttError> {
        let options = mqtt_options(config)?;
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let bus = Self {
            client,
            request_timeout: config.request_timeout(),
            retain: config.retain,
        };
        Ok((bus, eventloop))
    }

    /// Handle for the event loop task.
    #[must_use]
    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }

    /// Ask the broker to close the connection.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Timeout`] or [`MqttError::Client`].
    pub async fn disconnect(&self) -> Result<(), MqttError> {
        self.bounded("disconnect", self.client.disconnect()).await
    }

    async fn bounded<F>(&self, operation: &'static str, request: F) -> Result<(), MqttError>
    where
        F: Future<Output = Result<(), ClientError>>,
    {
        tokio::time::timeout(self.request_timeout, request)
            .await
            .map_err(|_| MqttError::Timeout { operation })?
            .map_err(MqttError::Client)
    }
}

impl BusTransport for MqttBus {
    async fn publish(&self, topic: &str, value: &str) -> Result<(), BridgeError> {
        tracing::debug!(topic, value, "publishing");
        let request = self
            .client
            .publish(topic, QoS::AtMostOnce, self.retain, value.to_owned());
        self.bounded("publish", request).await?;
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<(), BridgeError> {
        tracing::debug!(topic, "subscribing");
        self.bounded("subscribe", self.client.subscribe(topic, QoS::AtMostOnce))
            .await?;
        Ok(())
    }

    async fn unsubscribe(&self, topic: &str) -> Result<(), BridgeError> {
        tracing::debug!(topic, "unsubscribing");
        self.bounded("unsubscribe", self.client.unsubscribe(topic))
            .await?;
        Ok(())
    }
}
