//! The on-disk config document.
//!
//! One file holds the chat API key, the bus credentials, and the bridge
//! state (authorized users and registrations). The `mqtt` section is kept
//! as an opaque table so that transport settings survive a rewrite even if
//! this crate does not know them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use lights_domain::id::UserId;
use lights_domain::registration::Registration;
use lights_domain::state::BridgeState;
use lights_domain::users::AuthorizedUsers;

use crate::error::StoreError;

/// Full contents of the config file.
///
/// Field order matters: TOML needs plain values before tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Telegram Bot API key.
    pub api_key: String,
    /// Telegram user id of the admin account. `0` until configured.
    #[serde(default)]
    pub admin_id: UserId,
    /// Users approved by the admin. Maintained by the bridge.
    #[serde(default)]
    pub authorized_users: Vec<UserId>,
    /// Bus connection settings (`url`, `username`, `password`, ...).
    #[serde(default)]
    pub mqtt: toml::Table,
    /// Registered devices. Maintained by the bridge.
    #[serde(default)]
    pub registration: Vec<Registration>,
}

impl ConfigDocument {
    /// The placeholder document written when no usable config exists.
    #[must_use]
    pub fn template() -> Self {
        let mut mqtt = toml::Table::new();
        mqtt.insert("url".into(), "wss://MQTT_HOST:MQTT_PORT".into());
        mqtt.insert("username".into(), "MQTT_USERNAME".into());
        mqtt.insert("password".into(), "MQTT_PASSWORD".into());
        Self {
            api_key: "API_KEY_GOES_HERE".to_string(),
            admin_id: UserId::default(),
            authorized_users: Vec::new(),
            mqtt,
            registration: Vec::new(),
        }
    }

    /// Read and parse the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read and
    /// [`StoreError::Parse`] if it is not a valid document.
    pub async fn read(path: &Path) -> Result<Self, StoreError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse a document from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] if `content` is not a valid document.
    pub fn parse(content: &str) -> Result<Self, StoreError> {
        Ok(toml::from_str(content)?)
    }

    /// Render the document as TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialize`] if the document cannot be rendered.
    pub fn render(&self) -> Result<String, StoreError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the document to `path`, replacing it atomically.
    ///
    /// The text goes to a sibling temporary file first and is then renamed
    /// over `path`, so readers never see a half-written file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialize`] or [`StoreError::Io`].
    pub async fn write(&self, path: &Path) -> Result<(), StoreError> {
        let content = self.render()?;
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Build the bridge state held in this document.
    ///
    /// Registrations that fail validation are skipped with a warning.
    #[must_use]
    pub fn to_state(&self) -> BridgeState {
        let users = AuthorizedUsers::new(self.admin_id, self.authorized_users.iter().copied());
        let registrations = self.registration.iter().filter_map(|reg| {
            let mut reg = reg.clone();
            reg.last_value = None;
            match reg.validate() {
                Ok(()) => Some(reg),
                Err(err) => {
                    tracing::warn!(name = %reg.name, error = %err, "skipping invalid registration");
                    None
                }
            }
        });
        BridgeState::new(users, registrations)
    }

    /// Copy of this document carrying `state` instead of its own users and
    /// registrations.
    #[must_use]
    pub fn with_state(&self, state: &BridgeState) -> Self {
        Self {
            api_key: self.api_key.clone(),
            admin_id: state.users.admin(),
            authorized_users: state.users.users().to_vec(),
            mqtt: self.mqtt.clone(),
            registration: state.registrations().to_vec(),
        }
    }
}
