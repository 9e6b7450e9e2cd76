//! Serde types for the Telegram Bot API.
//!
//! Only the fields the bridge reads are modelled; everything else is ignored.

use serde::{Deserialize, Serialize};

/// Generic Telegram API response wrapper.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub description: Option<String>,
    pub result: Option<T>,
}

/// A Telegram Update object from `getUpdates`.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

impl User {
    /// Name used in logs and admin notifications.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.first_name)
    }
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// `reply_markup` of a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Keyboard(ReplyKeyboardMarkup),
    Remove(ReplyKeyboardRemove),
}

impl ReplyMarkup {
    /// One-time keyboard with one button per row.
    #[must_use]
    pub fn one_per_row(buttons: &[String]) -> Self {
        Self::Keyboard(ReplyKeyboardMarkup {
            keyboard: buttons
                .iter()
                .map(|text| vec![KeyboardButton { text: text.clone() }])
                .collect(),
            one_time_keyboard: true,
            resize_keyboard: true,
        })
    }

    #[must_use]
    pub fn remove() -> Self {
        Self::Remove(ReplyKeyboardRemove {
            remove_keyboard: true,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub one_time_keyboard: bool,
    pub resize_keyboard: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboardRemove {
    pub remove_keyboard: bool,
}

/// `sendMessage` result; only the id is kept.
#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}
