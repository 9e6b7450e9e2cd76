//! # lights-adapter-storage-toml
//!
//! Storage adapter: keeps the bridge state in the same human-editable TOML
//! file that carries the API key and bus credentials.
//!
//! ```toml
//! api_key = "API_KEY_GOES_HERE"
//! admin_id = 0
//! authorized_users = [42]
//!
//! [mqtt]
//! url = "wss://MQTT_HOST:MQTT_PORT"
//! username = "MQTT_USERNAME"
//! password = "MQTT_PASSWORD"
//!
//! [[registration]]
//! name = "lamp"
//! topic = "home/lamp"
//! values = ["on", "off"]
//! ```
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `lights-app` and `lights-domain`.

mod document;
mod error;
mod store;

pub use document::ConfigDocument;
pub use error::StoreError;
pub use store::TomlStateStore;
