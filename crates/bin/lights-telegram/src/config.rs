//! Configuration loading: one TOML document plus environment overrides.
//!
//! The config file doubles as the bridge's state store, so it is read once
//! here and then handed to [`TomlStateStore`](lights_adapter_storage_toml::TomlStateStore).
//! When it is missing or unreadable a template is written for the user to
//! fill in and startup fails.

use std::path::{Path, PathBuf};

use lights_adapter_mqtt::MqttConfig;
use lights_adapter_mqtt::broker::BrokerUrl;
use lights_adapter_storage_toml::{ConfigDocument, StoreError};

const DEFAULT_PATH: &str = "config.toml";
const DEFAULT_LOG_FILTER: &str = "lights_telegram=info,lights=info";
const API_KEY_PLACEHOLDER: &str = "API_KEY_GOES_HERE";

/// Process-level settings resolved before the config file is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_path: PathBuf,
    /// Filter directive (`RUST_LOG` syntax).
    pub log_filter: String,
}

impl Settings {
    /// Resolve settings from the command line and the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Config path: first argument, else `LIGHTS_CONFIG`, else
    /// `config.toml`. Log filter: `LIGHTS_LOG`, else `RUST_LOG`.
    fn resolve(
        mut args: impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let config_path = args
            .next()
            .or_else(|| env("LIGHTS_CONFIG"))
            .unwrap_or_else(|| DEFAULT_PATH.to_string());
        let log_filter = env("LIGHTS_LOG")
            .or_else(|| env("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Self {
            config_path: PathBuf::from(config_path),
            log_filter,
        }
    }
}

/// Connection settings taken from the document.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram Bot API key.
    pub api_key: String,
    pub mqtt: MqttConfig,
}

impl Config {
    /// Extract connection settings from `document`, then apply
    /// `LIGHTS_API_KEY` and `LIGHTS_MQTT_URL` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the `[mqtt]` section is malformed, the
    /// API key is still the placeholder, or the broker URL is invalid.
    pub fn from_document(
        document: &ConfigDocument,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mqtt = toml::Value::Table(document.mqtt.clone())
            .try_into::<MqttConfig>()
            .map_err(ConfigError::Mqtt)?;
        let mut config = Self {
            api_key: document.api_key.clone(),
            mqtt,
        };
        config.apply_env_overrides(env);
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(val) = env("LIGHTS_API_KEY") {
            self.api_key = val;
        }
        if let Some(val) = env("LIGHTS_MQTT_URL") {
            self.mqtt.url = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() || self.api_key == API_KEY_PLACEHOLDER {
            return Err(ConfigError::Validation("api_key is not set".to_string()));
        }
        BrokerUrl::parse(&self.mqtt.url)?;
        Ok(())
    }
}

/// Read the document at `path`.
///
/// A missing file is replaced by the template. A malformed file is left
/// alone and the template goes to `<path>.default` instead. Both cases
/// still fail so the user can edit the file first.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`], [`ConfigError::Malformed`], or
/// [`ConfigError::Store`] for any other I/O failure.
pub async fn load_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    match ConfigDocument::read(path).await {
        Ok(document) => Ok(document),
        Err(err) if err.is_not_found() => {
            ConfigDocument::template().write(path).await?;
            Err(ConfigError::Missing {
                path: path.to_path_buf(),
            })
        }
        Err(err @ StoreError::Parse(_)) => {
            let template = template_path(path);
            ConfigDocument::template().write(&template).await?;
            Err(ConfigError::Malformed {
                template,
                source: err,
            })
        }
        Err(err) => Err(ConfigError::Store(err)),
    }
}

fn template_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".default");
    path.with_file_name(name)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {} not found, a template was written there", .path.display())]
    Missing { path: PathBuf },
    #[error("failed to parse config file, a template was written to {}", .template.display())]
    Malformed {
        template: PathBuf,
        #[source]
        source: StoreError,
    },
    #[error("failed to access config file")]
    Store(#[from] StoreError),
    #[error("invalid [mqtt] section")]
    Mqtt(#[source] toml::de::Error),
    #[error(transparent)]
    Broker(#[from] lights_adapter_mqtt::MqttError),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn args(values: &[&str]) -> impl Iterator<Item = String> + use<> {
        values
            .iter()
            .map(|v| (*v).to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn document(mqtt_url: &str) -> ConfigDocument {
        ConfigDocument::parse(&format!(
            "api_key = \"123:abc\"\nadmin_id = 1000\n\n[mqtt]\nurl = \"{mqtt_url}\"\nusername = \"bridge\"\n"
        ))
        .unwrap()
    }

    #[test]
    fn should_default_settings() {
        let settings = Settings::resolve(args(&[]), env_of(&[]));
        assert_eq!(settings.config_path, PathBuf::from("config.toml"));
        assert_eq!(settings.log_filter, "lights_telegram=info,lights=info");
    }

    #[test]
    fn should_prefer_argument_over_env_for_path() {
        let env = env_of(&[("LIGHTS_CONFIG", "/etc/lights.toml")]);
        let settings = Settings::resolve(args(&["./mine.toml"]), env);
        assert_eq!(settings.config_path, PathBuf::from("./mine.toml"));

        let env = env_of(&[("LIGHTS_CONFIG", "/etc/lights.toml")]);
        let settings = Settings::resolve(args(&[]), env);
        assert_eq!(settings.config_path, PathBuf::from("/etc/lights.toml"));
    }

    #[test]
    fn should_prefer_lights_log_over_rust_log() {
        let env = env_of(&[("LIGHTS_LOG", "debug"), ("RUST_LOG", "warn")]);
        assert_eq!(Settings::resolve(args(&[]), env).log_filter, "debug");

        let env = env_of(&[("RUST_LOG", "warn")]);
        assert_eq!(Settings::resolve(args(&[]), env).log_filter, "warn");
    }

    #[test]
    fn should_read_connection_settings_from_document() {
        let config = Config::from_document(&document("mqtt://broker.local"), env_of(&[])).unwrap();
        assert_eq!(config.api_key, "123:abc");
        assert_eq!(config.mqtt.url, "mqtt://broker.local");
        assert_eq!(config.mqtt.username, "bridge");
        assert_eq!(config.mqtt.client_id, "lights-telegram");
    }

    #[test]
    fn should_apply_env_overrides() {
        let env = env_of(&[
            ("LIGHTS_API_KEY", "999:zzz"),
            ("LIGHTS_MQTT_URL", "wss://cloud.example.com/mqtt"),
        ]);
        let config = Config::from_document(&document("mqtt://broker.local"), env).unwrap();
        assert_eq!(config.api_key, "999:zzz");
        assert_eq!(config.mqtt.url, "wss://cloud.example.com/mqtt");
    }

    #[test]
    fn should_reject_template_document() {
        let result = Config::from_document(&ConfigDocument::template(), env_of(&[]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_invalid_broker_url() {
        let result = Config::from_document(&document("broker.local"), env_of(&[]));
        assert!(matches!(result, Err(ConfigError::Broker(_))));
    }

    #[test]
    fn should_reject_malformed_mqtt_section() {
        let doc = ConfigDocument::parse("api_key = \"k\"\n[mqtt]\nkeep_alive_secs = \"soon\"\n").unwrap();
        let result = Config::from_document(&doc, env_of(&[]));
        assert!(matches!(result, Err(ConfigError::Mqtt(_))));
    }

    #[test]
    fn should_name_template_after_config_file() {
        assert_eq!(
            template_path(Path::new("/etc/lights/config.toml")),
            PathBuf::from("/etc/lights/config.toml.default")
        );
    }

    #[tokio::test]
    async fn should_write_template_when_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let result = load_document(&path).await;
        assert!(matches!(result, Err(ConfigError::Missing { .. })));

        let written = ConfigDocument::read(&path).await.unwrap();
        assert_eq!(written, ConfigDocument::template());
    }

    #[tokio::test]
    async fn should_keep_malformed_file_and_write_template_beside_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_key = [oops").unwrap();

        let result = load_document(&path).await;
        assert!(matches!(result, Err(ConfigError::Malformed { .. })));

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "api_key = [oops");
        let template = ConfigDocument::read(&dir.path().join("config.toml.default"))
            .await
            .unwrap();
        assert_eq!(template, ConfigDocument::template());
    }

    #[tokio::test]
    async fn should_load_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        document("mqtt://broker.local").write(&path).await.unwrap();

        let loaded = load_document(&path).await.unwrap();
        assert_eq!(loaded.api_key, "123:abc");
    }
}
