//! Chat port: replies and notifications towards chat users.

use std::future::Future;

use lights_domain::error::BridgeError;
use lights_domain::id::{ChatId, MessageId, UserId};

/// A text message received from the chat service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender identity.
    pub from: UserId,
    /// Human readable sender name, used in logs and admin notifications.
    pub display_name: String,
    /// Chat the message was posted in.
    pub chat: ChatId,
    /// Id of the message itself, replies are threaded onto it.
    pub message: MessageId,
    pub text: String,
}

/// Outbound operations on the chat service.
pub trait ChatTransport {
    /// Send an unsolicited message to `user`'s private chat.
    fn send_plain(
        &self,
        user: UserId,
        text: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Reply to `message`, clearing any custom keyboard.
    fn send_reply(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Reply to `message` offering `buttons` as one-tap answers.
    fn send_reply_with_keyboard(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        buttons: &[String],
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: ChatTransport + Send + Sync> ChatTransport for std::sync::Arc<T> {
    fn send_plain(
        &self,
        user: UserId,
        text: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).send_plain(user, text)
    }

    fn send_reply(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).send_reply(chat, message, text)
    }

    fn send_reply_with_keyboard(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        buttons: &[String],
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).send_reply_with_keyboard(chat, message, text, buttons)
    }
}
