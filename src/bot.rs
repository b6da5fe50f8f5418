use crate::commands::{self, Command};
use crate::config::Config;
use crate::error::{RelayError, SendError};
use crate::models::{InboundMessage, Notification};
use crate::store::{ChatStore, FileStore, MemoryStore};
use crate::telegram::TelegramSender;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Outbound delivery capability. One implementation talks to the Telegram
/// API; tests substitute a recording fake.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), SendError>;
}

/// The dispatcher: owns the two input loops and the subscription policy.
///
/// All collaborators are constructor-injected; there is no process-global
/// state. Only the configured administrator may issue commands.
pub struct Bot {
    store: Arc<dyn ChatStore>,
    sender: Arc<dyn Sender>,
    admin_id: i64,
}

impl Bot {
    pub fn new(store: Arc<dyn ChatStore>, sender: Arc<dyn Sender>, admin_id: i64) -> Self {
        Self {
            store,
            sender,
            admin_id,
        }
    }

    /// Drives the message loop and the alert loop concurrently until `cancel`
    /// fires or both inbound channels close. Neither loop blocks the other;
    /// items still queued when the loops stop are dropped.
    pub async fn run(
        &self,
        cancel: CancellationToken,
        messages: mpsc::Receiver<InboundMessage>,
        alerts: mpsc::Receiver<Notification>,
    ) -> Result<(), RelayError> {
        tokio::join!(
            self.message_loop(cancel.clone(), messages),
            self.alert_loop(cancel, alerts),
        );
        Ok(())
    }

    async fn message_loop(
        &self,
        cancel: CancellationToken,
        mut messages: mpsc::Receiver<InboundMessage>,
    ) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                maybe = messages.recv() => {
                    match maybe {
                        Some(message) => self.handle_message(message).await,
                        None => break,
                    }
                }
            }
        }
    }

    async fn alert_loop(
        &self,
        cancel: CancellationToken,
        mut alerts: mpsc::Receiver<Notification>,
    ) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                maybe = alerts.recv() => {
                    match maybe {
                        Some(notification) => self.handle_notification(notification).await,
                        None => break,
                    }
                }
            }
        }
    }

    /// Authorization comes first: messages from anyone but the administrator
    /// are dropped before they are even logged as received.
    async fn handle_message(&self, message: InboundMessage) {
        if message.sender.id != self.admin_id {
            tracing::info!(
                err = "dropped message from forbidden sender",
                sender_id = message.sender.id,
                sender_username = %message.sender.username.as_deref().unwrap_or_default(),
                "failed to process message"
            );
            return;
        }

        tracing::debug!(text = %message.text, "message received");

        match Command::parse(&message.text) {
            Command::Start => self.subscribe(&message).await,
            Command::Stop => self.unsubscribe(&message).await,
            Command::Help => self.reply(message.chat.id, commands::RESPONSE_HELP).await,
            Command::Chats => self.list_chats(&message).await,
            Command::Unknown => self.reply(message.chat.id, commands::RESPONSE_FALLBACK).await,
        }
    }

    async fn subscribe(&self, message: &InboundMessage) {
        if let Err(e) = self.store.add(message.chat.clone()) {
            tracing::error!(error = %e, "failed to add subscriber");
            return;
        }
        tracing::info!(
            username = %message.sender.username.as_deref().unwrap_or_default(),
            user_id = message.sender.id,
            "user subscribed"
        );
        let text = commands::response_subscribed(&message.sender.first_name);
        self.reply(message.chat.id, &text).await;
    }

    async fn unsubscribe(&self, message: &InboundMessage) {
        if let Err(e) = self.store.remove(&message.chat) {
            tracing::error!(error = %e, "failed to remove subscriber");
            return;
        }
        tracing::info!(
            username = %message.sender.username.as_deref().unwrap_or_default(),
            user_id = message.sender.id,
            "user unsubscribed"
        );
        let text = commands::response_unsubscribed(&message.sender.first_name);
        self.reply(message.chat.id, &text).await;
    }

    async fn list_chats(&self, message: &InboundMessage) {
        let chats = match self.store.list() {
            Ok(chats) => chats,
            Err(e) => {
                tracing::error!(error = %e, "failed to list subscribers");
                return;
            }
        };

        if chats.is_empty() {
            self.reply(message.chat.id, commands::RESPONSE_CHATS_NONE)
                .await;
            return;
        }

        let mut text = String::from(commands::RESPONSE_CHATS_HEADER);
        for chat in &chats {
            text.push('@');
            text.push_str(chat.username.as_deref().unwrap_or_default());
            text.push('\n');
        }
        self.reply(message.chat.id, &text).await;
    }

    /// Fan-out is a fixed-order sequential loop; one failed delivery never
    /// suppresses the remaining recipients.
    async fn handle_notification(&self, notification: Notification) {
        let chats = match self.store.list() {
            Ok(chats) => chats,
            Err(e) => {
                tracing::error!(error = %e, "failed to list subscribers, dropping notification");
                return;
            }
        };

        let text = notification.render();
        if text.is_empty() {
            tracing::debug!("notification rendered empty, nothing to send");
            return;
        }

        for chat in &chats {
            if let Err(e) = self.sender.send_message(chat.id, &text).await {
                tracing::warn!(chat_id = chat.id, error = %e, "failed to deliver notification");
            }
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.sender.send_message(chat_id, text).await {
            tracing::warn!(chat_id, error = %e, "failed to send reply");
        }
    }
}

/// Wires config into a running relay: telegram transport, webhook listener,
/// and the dispatcher, all sharing one cancellation token.
pub async fn run_relay(config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn ChatStore> = match &config.store_path {
        Some(path) => Arc::new(FileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    };

    let telegram = teloxide::Bot::new(&config.telegram_bot_token);
    let sender = Arc::new(TelegramSender::new(telegram.clone()));
    let bot = Bot::new(store, sender, config.admin_id);

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    let (message_tx, message_rx) = mpsc::channel(64);
    let (alert_tx, alert_rx) = mpsc::channel(64);

    let webhook_addr = config.webhook_addr()?;
    let transport = crate::telegram::listen(telegram, message_tx, cancel.clone());
    let webhook = crate::webhook::run_server(webhook_addr, cancel.clone(), alert_tx);
    let dispatcher = bot.run(cancel.clone(), message_rx, alert_rx);

    tracing::info!("Relay started. Waiting for alerts...");

    tokio::select! {
        result = webhook => {
            result.map_err(Into::into)
        }
        () = transport => {
            tracing::info!("Telegram transport stopped");
            Ok(())
        }
        result = dispatcher => {
            tracing::info!("Dispatcher stopped");
            result.map_err(Into::into)
        }
        () = cancel.cancelled() => {
            tracing::info!("Shutdown signal received");
            Ok(())
        }
    }
}

fn spawn_signal_handler(cancel_token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("Failed to register SIGTERM handler");
            tokio::select! {
                () = async { ctrl_c.await.expect("ctrl_c failed"); } => {
                    tracing::info!("Received SIGINT, shutting down...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, shutting down...");
                }
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("Failed to register Ctrl+C handler");
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        cancel_token.cancel();
    });
}
