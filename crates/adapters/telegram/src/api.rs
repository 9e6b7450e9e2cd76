//! Raw HTTP calls to the Telegram Bot API.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::TelegramError;
use crate::types::{ApiResponse, ReplyMarkup, SentMessage, Update, User};

/// Headroom on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Low-level Telegram Bot API client.
pub struct TelegramApi {
    client: Client,
    base_url: String,
}

impl TelegramApi {
    /// Create a new API client for the given bot token.
    #[must_use]
    pub fn new(bot_token: &str) -> Self {
        Self::with_base_url(bot_token, "https://api.telegram.org")
    }

    /// Create a new API client with a custom base URL.
    #[must_use]
    pub fn with_base_url(bot_token: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<T, TelegramError> {
        let resp = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await?;
        let api_resp: ApiResponse<T> = resp.json().await?;
        if !api_resp.ok {
            let desc = api_resp.description.unwrap_or_default();
            tracing::warn!(method, "Telegram call failed: {desc}");
            return Err(TelegramError::Api(desc));
        }
        api_resp
            .result
            .ok_or_else(|| TelegramError::Api(format!("{method} returned no result")))
    }

    /// Identity of the bot behind the token. Used to verify the key at
    /// startup.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] if the request fails or the key is rejected.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &json!({}), REQUEST_TIMEOUT).await
    }

    /// Long-poll for new updates.
    ///
    /// `offset` should be `last_update_id + 1` to acknowledge previously
    /// received updates.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] if the request fails.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(off) = offset {
            body["offset"] = json!(off);
        }
        self.call(
            "getUpdates",
            &body,
            Duration::from_secs(timeout_secs) + POLL_GRACE,
        )
        .await
    }

    /// Send a text message, optionally threaded onto `reply_to`.
    ///
    /// Returns the sent message's id.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] if the request fails.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
        reply_markup: Option<&ReplyMarkup>,
    ) -> Result<i64, TelegramError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(message_id) = reply_to {
            body["reply_parameters"] = json!({
                "message_id": message_id,
                "allow_sending_without_reply": true,
            });
        }
        if let Some(markup) = reply_markup {
            body["reply_markup"] = serde_json::to_value(markup)?;
        }

        tracing::debug!(chat_id, "sendMessage");
        let sent: SentMessage = self.call("sendMessage", &body, REQUEST_TIMEOUT).await?;
        Ok(sent.message_id)
    }
}
