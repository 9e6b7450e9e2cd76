//! Bus port: publish/subscribe on the message bus.
//!
//! Every outbound call is a round-trip that fails with
//! [`BridgeError::Transport`] once the adapter's own timeout expires; the
//! core never waits on the bus without that bound.

use std::future::Future;

use lights_domain::error::BridgeError;

/// Outbound operations on the message bus.
pub trait BusTransport {
    /// Publish `value` on `topic`.
    fn publish(
        &self,
        topic: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Start receiving messages published on `topic`.
    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Stop receiving messages published on `topic`.
    fn unsubscribe(&self, topic: &str) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: BusTransport + Send + Sync> BusTransport for std::sync::Arc<T> {
    fn publish(
        &self,
        topic: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).publish(topic, value)
    }

    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).subscribe(topic)
    }

    fn unsubscribe(&self, topic: &str) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).unsubscribe(topic)
    }
}

/// Inbound side of the bus: the adapter hands every received message here.
pub trait BusListener {
    /// A message arrived on `topic`.
    fn on_message(&self, topic: &str, payload: &[u8]) -> impl Future<Output = ()> + Send;

    /// Topics that must be subscribed whenever the bus (re)connects.
    fn topics(&self) -> impl Future<Output = Vec<String>> + Send;
}
