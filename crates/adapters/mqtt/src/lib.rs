//! # lights-adapter-mqtt
//!
//! MQTT adapter: the bridge's message bus.
//!
//! ## Responsibilities
//! - Connect to the broker over TCP, TLS, WS or WSS (chosen by URL scheme)
//! - Publish device commands (`BusTransport`)
//! - Resubscribe every registered topic after each (re)connect
//! - Hand inbound publishes to the core's `BusListener`
//!
//! ## Dependency rule
//! Depends on `lights-app` (ports) and `lights-domain` (error types).

pub mod broker;
pub mod bus;
pub mod config;
pub mod error;
pub mod event_loop;

pub use bus::MqttBus;
pub use config::MqttConfig;
pub use error::MqttError;
pub use event_loop::run_event_loop;
