//! ghostline
//!
//! Ghost-mode Telegram relay agent: watches one operator's account, learns a
//! rolling style profile from their own outgoing messages, and - only while
//! the operator has turned the mode on - generates and sends replies in their
//! place for messages that pass a relevance rule.
//!
//! # Architecture
//!
//! ```text
//! Telegram ──► InboundEvent ──┬── operator ──► Command Parser ──► ModeStore
//! (teloxide)                  │                   │ (not a command)
//!                             │                   └──► StyleCorpus
//!                             │
//!                             └── others ──► Classifier ──► Prompt + Oracle
//!                                               │               (Gemini)
//!                                           ModeStore            │
//!                                        (fail-closed)      Sanitizer
//!                                                                │
//!                                            typing ◄── Dispatcher ──► send
//!                                                      (jittered delay)
//! ```
//!
//! Both stores live in one SQLite database; generation failures collapse into
//! fallback phrases; nothing in steady-state event handling can take the
//! process down.

pub mod classify;
pub mod command;
pub mod config;
pub mod corpus;
pub mod dispatch;
pub mod event;
pub mod llm;
pub mod prompt;
pub mod relay;
pub mod sanitize;
pub mod store;
pub mod telegram;

pub use classify::{classify, IgnoreReason, Verdict};
pub use command::{parse as parse_command, Command, Parsed};
pub use config::Config;
pub use corpus::{StyleCorpus, DEFAULT_STYLE};
pub use dispatch::{Dispatcher, Transport, TransportError};
pub use event::{ChatKind, InboundEvent};
pub use llm::{generate_reply, GeminiClient, GeneratedReply, Oracle};
pub use relay::Relay;
pub use sanitize::{next_fallback, sanitize, FALLBACK_REPLIES};
pub use store::ModeStore;
