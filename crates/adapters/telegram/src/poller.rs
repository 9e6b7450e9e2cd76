//! Long-polling loop for Telegram Bot API `getUpdates`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use lights_app::ports::InboundMessage;
use lights_domain::id::{ChatId, MessageId, UserId};

use crate::api::TelegramApi;
use crate::types::Message;

const MAX_BACKOFF_SECS: u64 = 60;

/// Run the long-polling loop until `cancel` flips to `true` or the
/// receiving side of `tx` is dropped.
///
/// Every text message with a sender is forwarded as an [`InboundMessage`];
/// other updates are acknowledged and skipped.
pub async fn poll_loop(
    api: Arc<TelegramApi>,
    poll_timeout: u64,
    tx: mpsc::Sender<InboundMessage>,
    mut cancel: watch::Receiver<bool>,
) {
    let mut offset: Option<i64> = None;
    let mut backoff_secs = 1u64;

    tracing::info!("Telegram poller started");

    loop {
        if *cancel.borrow() {
            tracing::info!("Telegram poller shutting down");
            return;
        }

        let updates = tokio::select! {
            result = api.get_updates(offset, poll_timeout) => result,
            _ = cancel.changed() => {
                tracing::info!("Telegram poller cancelled");
                return;
            }
        };

        match updates {
            Ok(updates) => {
                backoff_secs = 1;
                for update in updates {
                    offset = Some(update.update_id + 1);
                    let Some(inbound) = update.message.and_then(to_inbound) else {
                        tracing::debug!(update_id = update.update_id, "skipping update");
                        continue;
                    };
                    if tx.send(inbound).await.is_err() {
                        tracing::warn!("message channel closed, stopping poller");
                        return;
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, backoff_secs, "getUpdates failed, backing off");
                tokio::select! {
                    () = tokio::time::sleep(Duration::from_secs(backoff_secs)) => {}
                    _ = cancel.changed() => {
                        tracing::info!("Telegram poller cancelled");
                        return;
                    }
                }
                backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
            }
        }
    }
}

/// Convert a Bot API message into the core's inbound message. Messages
/// without text or sender are dropped.
fn to_inbound(msg: Message) -> Option<InboundMessage> {
    let from = msg.from?;
    let text = msg.text?;
    Some(InboundMessage {
        from: UserId::new(from.id),
        display_name: from.display_name().to_string(),
        chat: ChatId::new(msg.chat.id),
        message: MessageId::new(msg.message_id),
        text,
    })
}
