//! Broker URL parsing and conversion to rumqttc options.

use rumqttc::{MqttOptions, Transport};
use url::{Host, ParseError, Url};

use crate::config::MqttConfig;
use crate::error::MqttError;

/// Transport selected by the URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// `mqtt://` or `tcp://`
    Tcp,
    /// `mqtts://` or `ssl://`
    Tls,
    /// `ws://`
    Ws,
    /// `wss://`
    Wss,
}

impl Scheme {
    fn parse(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "mqtt" | "tcp" => Some(Self::Tcp),
            "mqtts" | "ssl" => Some(Self::Tls),
            "ws" => Some(Self::Ws),
            "wss" => Some(Self::Wss),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "mqtt",
            Self::Tls => "mqtts",
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }

    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Self::Tcp => 1883,
            Self::Tls => 8883,
            Self::Ws => 80,
            Self::Wss => 443,
        }
    }

    fn is_websocket(self) -> bool {
        matches!(self, Self::Ws | Self::Wss)
    }
}

/// A parsed `scheme://[user[:password]@]host[:port][/path]` broker address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerUrl {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Path including the leading `/`, empty when absent. Only meaningful
    /// for websocket transports.
    pub path: String,
    /// Userinfo embedded in the URL, as written.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl BrokerUrl {
    /// Parse a broker URL.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::InvalidUrl`] when the scheme is missing or
    /// unsupported, the host is empty, or the port is not a number.
    pub fn parse(raw: &str) -> Result<Self, MqttError> {
        if !raw.contains("://") {
            return Err(MqttError::invalid_url(raw, "missing scheme"));
        }
        let url = Url::parse(raw).map_err(|err| MqttError::invalid_url(raw, reason(err)))?;
        let scheme = Scheme::parse(url.scheme())
            .ok_or_else(|| MqttError::invalid_url(raw, "unsupported scheme"))?;

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => return Err(MqttError::invalid_url(raw, "missing host")),
        };
        let path = match url.path() {
            "/" => String::new(),
            path => path.to_string(),
        };
        let username = Some(url.username())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(Self {
            scheme,
            host,
            port: url.port().unwrap_or(scheme.default_port()),
            path,
            username,
            password: url.password().map(str::to_string),
        })
    }

    /// Broker address handed to rumqttc. Websocket transports expect the
    /// full URL, the others only the host.
    fn broker_addr(&self) -> String {
        if self.scheme.is_websocket() {
            let host = if self.host.contains(':') {
                format!("[{}]", self.host)
            } else {
                self.host.clone()
            };
            format!(
                "{}://{}:{}{}",
                self.scheme.as_str(),
                host,
                self.port,
                self.path
            )
        } else {
            self.host.clone()
        }
    }

    fn transport(&self) -> Transport {
        match self.scheme {
            Scheme::Tcp => Transport::Tcp,
            Scheme::Tls => Transport::tls_with_default_config(),
            Scheme::Ws => Transport::Ws,
            Scheme::Wss => Transport::wss_with_default_config(),
        }
    }
}

fn reason(err: ParseError) -> &'static str {
    match err {
        ParseError::InvalidPort => "invalid port",
        ParseError::EmptyHost => "missing host",
        ParseError::RelativeUrlWithoutBase => "missing scheme",
        _ => "malformed url",
    }
}

/// Build rumqttc options from the adapter config.
///
/// Credentials from `[mqtt]` win over userinfo embedded in the URL.
///
/// # Errors
///
/// Returns [`MqttError::InvalidUrl`] if `config.url` cannot be parsed.
pub fn mqtt_options(config: &MqttConfig) -> Result<MqttOptions, MqttError> {
    let url = BrokerUrl::parse(&config.url)?;
    let mut options = MqttOptions::new(&config.client_id, url.broker_addr(), url.port);
    options.set_keep_alive(config.keep_alive());
    options.set_transport(url.transport());
    if !config.username.is_empty() {
        options.set_credentials(&config.username, &config.password);
    } else if let Some(username) = &url.username {
        options.set_credentials(username, url.password.as_deref().unwrap_or_default());
    }
    Ok(options)
}
