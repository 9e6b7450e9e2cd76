//! # lights-adapter-telegram
//!
//! Telegram adapter: the bridge's chat service.
//!
//! ## Responsibilities
//! - Long-poll `getUpdates` and forward text messages to the core
//! - Send replies, admin notifications and reply keyboards (`ChatTransport`)
//!
//! ## Dependency rule
//! Depends on `lights-app` (ports) and `lights-domain` (ids, errors).

pub mod api;
pub mod chat;
pub mod error;
pub mod poller;
pub mod types;

pub use api::TelegramApi;
pub use chat::TelegramChat;
pub use error::TelegramError;
pub use poller::poll_loop;
