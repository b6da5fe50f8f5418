use crate::bot::Sender;
use crate::error::SendError;
use crate::models::{Chat, InboundMessage, User};
use async_trait::async_trait;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Outbound half of the Telegram transport.
pub struct TelegramSender {
    bot: teloxide::Bot,
}

impl TelegramSender {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Sender for TelegramSender {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }
}

/// Polls Telegram for updates and forwards every text message as an
/// [`InboundMessage`]. Returns when cancelled; non-text updates are ignored.
pub async fn listen(
    bot: teloxide::Bot,
    tx: mpsc::Sender<InboundMessage>,
    cancel: CancellationToken,
) {
    let handler = Update::filter_message().endpoint({
        move |msg: Message| {
            let tx = tx.clone();
            async move {
                if let Some(inbound) = inbound_from(&msg) {
                    if tx.send(inbound).await.is_err() {
                        tracing::warn!("message channel closed, dropping update");
                    }
                }
                Ok::<(), teloxide::RequestError>(())
            }
        }
    });

    let mut dispatcher = Dispatcher::builder(bot, handler).build();

    tokio::select! {
        () = cancel.cancelled() => {
            tracing::info!("Telegram transport shutting down");
        }
        () = dispatcher.dispatch() => {}
    }
}

fn inbound_from(msg: &Message) -> Option<InboundMessage> {
    let from = msg.from.as_ref()?;
    let text = msg.text()?;

    let sender = User {
        id: from.id.0 as i64,
        first_name: from.first_name.clone(),
        username: from.username.clone(),
    };
    let chat = Chat {
        id: msg.chat.id.0,
        first_name: msg
            .chat
            .first_name()
            .unwrap_or(&sender.first_name)
            .to_string(),
        username: msg.chat.username().map(str::to_string),
    };

    Some(InboundMessage {
        id: i64::from(msg.id.0),
        sender,
        chat,
        text: text.to_string(),
    })
}
