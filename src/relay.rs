//! Event router
//!
//! Wires the whole pipeline together: operator text goes to the command
//! parser and then the style corpus; everything else goes through the
//! relevance classifier, the generator, and the dispatcher. One handler
//! invocation per event, independent of all others.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::classify::{classify, Verdict};
use crate::command::{self, Command, Parsed};
use crate::config::Config;
use crate::corpus::{StyleCorpus, DEFAULT_STYLE};
use crate::dispatch::{Dispatcher, Transport};
use crate::event::{ChatKind, InboundEvent};
use crate::llm::{generate_reply, Oracle};
use crate::prompt::build_prompt;
use crate::store::ModeStore;

/// Shared relay state; one instance per running agent
pub struct Relay {
    config: Config,
    mode: Mutex<ModeStore>,
    corpus: Mutex<StyleCorpus>,
    oracle: Arc<dyn Oracle>,
    dispatcher: Dispatcher,
}

impl Relay {
    pub fn new(
        config: Config,
        mode: ModeStore,
        corpus: StyleCorpus,
        oracle: Arc<dyn Oracle>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let dispatcher = Dispatcher::new(transport, config.delay_min_ms, config.delay_max_ms);
        Self {
            config,
            mode: Mutex::new(mode),
            corpus: Mutex::new(corpus),
            oracle,
            dispatcher,
        }
    }

    pub fn operator_id(&self) -> i64 {
        self.config.operator_id
    }

    pub fn operator_username(&self) -> Option<&str> {
        self.config.operator_username.as_deref()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one inbound event end to end.
    ///
    /// Never returns an error: every failure is handled locally (logged,
    /// reported to the operator, or recovered via fallback).
    pub async fn handle_event(&self, event: InboundEvent) {
        if event.sender_is_operator {
            self.handle_operator(event).await;
        } else {
            self.handle_remote(event).await;
        }
    }

    /// Operator-authored events: commands first, then style learning
    async fn handle_operator(&self, event: InboundEvent) {
        if event.is_service {
            return;
        }

        let Some(text) = event.text.as_deref() else {
            return;
        };

        match command::parse(text, &self.config.trigger) {
            Some(parsed) => {
                let ack = self.execute_command(parsed);
                if let Err(e) = self
                    .dispatcher
                    .transport()
                    .edit_message(event.chat_id, event.event_id, &ack)
                    .await
                {
                    warn!("Command ack failed for chat {}: {}", event.chat_id, e);
                }
            }
            None => {
                let recorded = self
                    .corpus
                    .lock()
                    .map_err(|_| anyhow::anyhow!("corpus lock poisoned"))
                    .and_then(|corpus| corpus.record(text));
                match recorded {
                    Ok(true) => debug!("Learned style sample from chat {}", event.chat_id),
                    Ok(false) => {}
                    Err(e) => warn!("Could not record style sample: {}", e),
                }
            }
        }
    }

    /// Apply a parsed command, producing the acknowledgment text.
    ///
    /// Store failures surface in the acknowledgment and leave state
    /// unchanged; they never propagate.
    fn execute_command(&self, parsed: Parsed) -> String {
        let cmd = match parsed {
            Parsed::Command(cmd) => cmd,
            Parsed::Unknown(sub) => {
                debug!("Unrecognized subcommand {:?}", sub);
                return command::usage(&self.config.trigger);
            }
        };

        info!("Operator command: {}", cmd.as_str());

        match cmd {
            Command::On => match self.set_mode(true) {
                Ok(()) => "Ghost mode: ON. Replying on your behalf.".to_string(),
                Err(e) => format!("Ghost mode unchanged, store error: {}", e),
            },
            Command::Off => match self.set_mode(false) {
                Ok(()) => "Ghost mode: OFF. Welcome back.".to_string(),
                Err(e) => format!("Ghost mode unchanged, store error: {}", e),
            },
            Command::Status => {
                let active = self.ghost_active();
                let samples = self
                    .corpus
                    .lock()
                    .ok()
                    .and_then(|corpus| corpus.len().ok());
                match samples {
                    Some(n) => format!(
                        "Ghost mode: {}. Style corpus: {} samples.",
                        if active { "ON" } else { "OFF" },
                        n
                    ),
                    None => format!(
                        "Ghost mode: {}. Style corpus unavailable.",
                        if active { "ON" } else { "OFF" }
                    ),
                }
            }
            Command::Clear => {
                let cleared = self
                    .corpus
                    .lock()
                    .map_err(|_| anyhow::anyhow!("corpus lock poisoned"))
                    .and_then(|corpus| corpus.clear());
                match cleared {
                    Ok(n) => format!("Style corpus cleared ({} samples removed).", n),
                    Err(e) => format!("Could not clear style corpus: {}", e),
                }
            }
            Command::Test => "ghostline is alive.".to_string(),
        }
    }

    /// Non-operator events: classify, generate, dispatch
    async fn handle_remote(&self, event: InboundEvent) {
        let active = self.ghost_active();

        match classify(&event, active) {
            Verdict::Ignore(reason) => {
                debug!("Dropping event in chat {}: {}", event.chat_id, reason.as_str());
            }
            Verdict::Reply => {
                info!(
                    "Reply attempt for chat {} ({:?})",
                    event.chat_id, event.chat_kind
                );

                let style = self.style_block();
                let prompt = build_prompt(&style, event.sender_name.as_deref(), event.text.as_deref());
                let timeout = Duration::from_secs(self.config.oracle_timeout_secs);
                let reply = generate_reply(self.oracle.as_ref(), &prompt, timeout).await;

                if reply.used_fallback {
                    debug!("Using fallback reply for chat {}", event.chat_id);
                }

                let quote = match event.chat_kind {
                    ChatKind::Group => Some(event.event_id),
                    ChatKind::Direct => None,
                };
                self.dispatcher.spawn_delivery(event.chat_id, reply.cleaned, quote);
            }
        }
    }

    fn set_mode(&self, active: bool) -> anyhow::Result<()> {
        self.mode
            .lock()
            .map_err(|_| anyhow::anyhow!("mode store lock poisoned"))?
            .set(active)
    }

    /// Read the ghost-mode flag, failing closed: any store error reads as OFF
    fn ghost_active(&self) -> bool {
        match self.mode.lock() {
            Ok(store) => match store.get() {
                Ok(active) => active,
                Err(e) => {
                    warn!("Mode state unreadable, treating as OFF: {}", e);
                    false
                }
            },
            Err(_) => {
                warn!("Mode store lock poisoned, treating as OFF");
                false
            }
        }
    }

    /// Current style block; store errors degrade to the default style
    fn style_block(&self) -> String {
        let block = self
            .corpus
            .lock()
            .map_err(|_| anyhow::anyhow!("corpus lock poisoned"))
            .and_then(|corpus| {
                corpus.style_block(self.config.style_window)
            });
        match block {
            Ok(block) => block,
            Err(e) => {
                warn!("Style corpus unreadable, using default style: {}", e);
                DEFAULT_STYLE.to_string()
            }
        }
    }
}
