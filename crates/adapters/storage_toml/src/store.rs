//! TOML file implementation of [`StateStore`].

use std::path::{Path, PathBuf};

use lights_app::ports::StateStore;
use lights_domain::error::BridgeError;
use lights_domain::state::BridgeState;

use crate::document::ConfigDocument;

/// Persists the bridge state into the config file it was loaded from.
///
/// The non-state parts of the document (API key, bus settings) are kept as
/// they were at startup and written back unchanged on every save.
pub struct TomlStateStore {
    path: PathBuf,
    base: ConfigDocument,
}

impl TomlStateStore {
    /// Create a store writing to `path`, preserving the settings of `base`.
    pub fn new(path: impl Into<PathBuf>, base: ConfigDocument) -> Self {
        Self {
            path: path.into(),
            base,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for TomlStateStore {
    async fn load(&self) -> Result<BridgeState, BridgeError> {
        let document = ConfigDocument::read(&self.path).await?;
        Ok(document.to_state())
    }

    async fn save(&self, state: &BridgeState) -> Result<(), BridgeError> {
        self.base.with_state(state).write(&self.path).await?;
        tracing::debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}
