//! MQTT adapter error types.

use lights_domain::error::BridgeError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The broker URL could not be understood.
    #[error("invalid broker url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    /// The rumqttc client returned an error.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// The request was not handed to the event loop in time.
    #[error("MQTT {operation} timed out")]
    Timeout { operation: &'static str },
}

impl MqttError {
    pub(crate) fn invalid_url(url: &str, reason: &'static str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason,
        }
    }

    /// Convert into a [`BridgeError::Transport`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> BridgeError {
        BridgeError::transport(self)
    }
}

impl From<MqttError> for BridgeError {
    fn from(err: MqttError) -> Self {
        err.into_domain()
    }
}
