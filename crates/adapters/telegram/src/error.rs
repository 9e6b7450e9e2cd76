//! Telegram adapter error types.

use lights_domain::error::BridgeError;

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The HTTP request failed or the body could not be decoded.
    #[error("Telegram request failed")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered with `ok: false`.
    #[error("Telegram API error: {0}")]
    Api(String),

    /// Reply markup could not be encoded.
    #[error("failed to encode reply markup")]
    Encode(#[from] serde_json::Error),
}

impl From<TelegramError> for BridgeError {
    fn from(err: TelegramError) -> Self {
        BridgeError::transport(err)
    }
}
