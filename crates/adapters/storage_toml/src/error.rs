//! Storage-specific error type wrapping file and TOML errors.

use lights_domain::error::BridgeError;

/// Errors originating from the TOML storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the file failed.
    #[error("config file error")]
    Io(#[from] std::io::Error),

    /// The file is not a valid config document.
    #[error("config file is malformed")]
    Parse(#[from] toml::de::Error),

    /// The state could not be rendered as TOML.
    #[error("failed to render config file")]
    Serialize(#[from] toml::ser::Error),
}

impl StoreError {
    /// Whether the config file simply does not exist yet.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<StoreError> for BridgeError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(Box::new(err))
    }
}
