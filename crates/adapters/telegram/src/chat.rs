//! [`ChatTransport`] implementation on top of [`TelegramApi`].

use std::sync::Arc;

use lights_app::ports::ChatTransport;
use lights_domain::error::BridgeError;
use lights_domain::id::{ChatId, MessageId, UserId};

use crate::api::TelegramApi;
use crate::types::ReplyMarkup;

#[derive(Clone)]
pub struct TelegramChat {
    api: Arc<TelegramApi>,
}

impl TelegramChat {
    #[must_use]
    pub fn new(api: Arc<TelegramApi>) -> Self {
        Self { api }
    }
}

impl ChatTransport for TelegramChat {
    async fn send_plain(&self, user: UserId, text: &str) -> Result<(), BridgeError> {
        tracing::debug!(to = %user, text, "sending message");
        self.api
            .send_message(ChatId::from(user).get(), text, None, None)
            .await?;
        Ok(())
    }

    async fn send_reply(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), BridgeError> {
        tracing::debug!(chat = %chat, text, "sending message");
        self.api
            .send_message(
                chat.get(),
                text,
                Some(message.get()),
                Some(&ReplyMarkup::remove()),
            )
            .await?;
        Ok(())
    }

    async fn send_reply_with_keyboard(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        buttons: &[String],
    ) -> Result<(), BridgeError> {
        tracing::debug!(chat = %chat, text, buttons = buttons.len(), "sending message");
        let markup = ReplyMarkup::one_per_row(buttons);
        self.api
            .send_message(chat.get(), text, Some(message.get()), Some(&markup))
            .await?;
        Ok(())
    }
}
