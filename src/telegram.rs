//! Telegram binding
//!
//! Teloxide long-polling loop plus the mapping between Telegram updates and
//! the transport-independent event model. Uses the explicit Dispatcher
//! pattern for reliable message polling.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::{ChatAction, MessageEntityKind, MessageId, MessageKind, ReplyParameters, Update},
};

use crate::config::Config;
use crate::corpus::StyleCorpus;
use crate::dispatch::{Transport, TransportError};
use crate::event::{ChatKind, InboundEvent};
use crate::llm::GeminiClient;
use crate::relay::Relay;
use crate::store::ModeStore;

/// Telegram-backed transport
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_presence(&self, chat_id: i64) -> Result<(), TransportError> {
        self.bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await
            .map_err(|e| TransportError::PresenceFailed(e.to_string()))?;
        Ok(())
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        quote: Option<i32>,
    ) -> Result<(), TransportError> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if let Some(message_id) = quote {
            request = request.reply_parameters(ReplyParameters::new(MessageId(message_id)));
        }
        request
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        event_id: i32,
        text: &str,
    ) -> Result<(), TransportError> {
        self.bot
            .edit_message_text(ChatId(chat_id), MessageId(event_id), text)
            .await
            .map_err(|e| TransportError::EditFailed(e.to_string()))?;
        Ok(())
    }
}

/// Normalize a Telegram message into an [`InboundEvent`]
pub fn event_from_message(
    msg: &Message,
    operator_id: i64,
    operator_username: Option<&str>,
) -> InboundEvent {
    let sender = msg.from.as_ref();
    let sender_id = sender.map(|u| u.id.0 as i64);

    let chat_kind = if msg.chat.is_private() {
        ChatKind::Direct
    } else {
        ChatKind::Group
    };

    let replied_to_operator = msg
        .reply_to_message()
        .and_then(|r| r.from.as_ref())
        .map(|u| u.id.0 as i64 == operator_id)
        .unwrap_or(false);

    InboundEvent {
        chat_id: msg.chat.id.0,
        event_id: msg.id.0,
        chat_kind,
        sender_is_operator: sender_id == Some(operator_id),
        sender_is_automated: sender.map(|u| u.is_bot).unwrap_or(false),
        is_service: !matches!(msg.kind, MessageKind::Common(_)),
        mentioned: mentions_operator(msg, operator_id, operator_username),
        replied_to_operator,
        sender_name: sender.map(|u| u.first_name.clone()),
        text: msg.text().map(String::from),
    }
}

/// True when the message @-mentions or text-mentions the operator
fn mentions_operator(msg: &Message, operator_id: i64, operator_username: Option<&str>) -> bool {
    if let Some(entities) = msg.entities() {
        let text_mentioned = entities.iter().any(|e| {
            matches!(&e.kind, MessageEntityKind::TextMention { user } if user.id.0 as i64 == operator_id)
        });
        if text_mentioned {
            return true;
        }
    }

    match (operator_username, msg.text()) {
        (Some(username), Some(text)) => {
            let handle = format!("@{}", username.to_lowercase());
            text.to_lowercase().contains(&handle)
        }
        _ => false,
    }
}

/// Run the agent against Telegram until shutdown
pub async fn run(config: Config) -> Result<()> {
    let bot = Bot::new(config.bot_token.clone());

    tracing::info!("===========================================");
    tracing::info!("  ghostline - starting...");
    tracing::info!("===========================================");
    tracing::info!("Operator id: {}", config.operator_id);
    tracing::info!("Database: {}", config.db_path.display());
    tracing::info!("Trigger: {}", config.trigger);
    tracing::info!(
        "Corpus cap: {} (min sample {} chars)",
        config.corpus_cap,
        config.min_sample_chars
    );

    // Verify bot token by calling getMe
    match bot.get_me().await {
        Ok(me) => {
            tracing::info!(
                "Bot authenticated: @{} (ID: {})",
                me.username.as_deref().unwrap_or("unknown"),
                me.id
            );
        }
        Err(e) => {
            tracing::error!("Failed to authenticate bot: {}", e);
            anyhow::bail!("Bot authentication failed: {}", e);
        }
    }

    // Delete any existing webhook so long polling works
    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!("Failed to delete webhook: {} (continuing anyway)", e);
    }

    let mode = ModeStore::open(&config.db_path)?;
    let corpus = StyleCorpus::open_with_config(
        &config.db_path,
        &config.trigger,
        config.corpus_cap,
        config.min_sample_chars,
    )?;
    let oracle = Arc::new(GeminiClient::new(&config.gemini_api_key));
    let transport = Arc::new(TelegramTransport::new(bot.clone()));

    let relay = Arc::new(Relay::new(config, mode, corpus, oracle, transport));

    let handler = dptree::entry().branch(Update::filter_message().endpoint(message_handler));

    tracing::info!("Starting dispatcher with long polling...");
    tracing::info!("Ghost mode resumes from its persisted value");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![Arc::clone(&relay)])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in message handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    // Shutting down: in-flight delayed sends are abandoned, not drained.
    // Delivery is at-most-once by design.
    let aborted = relay.dispatcher().abort_in_flight();
    if aborted > 0 {
        tracing::warn!("Abandoned {} in-flight replies on shutdown", aborted);
    }
    tracing::warn!("Dispatcher stopped");

    Ok(())
}

/// Message endpoint: normalize and hand off, never block the poll loop
async fn message_handler(msg: Message, relay: Arc<Relay>) -> ResponseResult<()> {
    let event = event_from_message(&msg, relay.operator_id(), relay.operator_username());

    tracing::debug!(
        ">>> Event: chat={}, kind={:?}, operator={}, service={}",
        event.chat_id,
        event.chat_kind,
        event.sender_is_operator,
        event.is_service
    );

    // Each event gets its own task; a slow oracle call for one chat must not
    // delay command handling or classification for any other
    tokio::spawn(async move {
        relay.handle_event(event).await;
    });

    Ok(())
}
