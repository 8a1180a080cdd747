//! Configuration management

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Agent configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,

    /// Telegram user id of the operator (the human this agent stands in for)
    pub operator_id: i64,

    /// Operator @username, used for mention detection in groups
    pub operator_username: Option<String>,

    /// Gemini API key for reply generation
    pub gemini_api_key: String,

    /// SQLite database path (mode state + style corpus)
    pub db_path: PathBuf,

    /// Command trigger token, e.g. ".ai"
    pub trigger: String,

    /// Maximum style samples kept in the corpus
    pub corpus_cap: usize,

    /// Minimum characters for a message to qualify as a style sample
    pub min_sample_chars: usize,

    /// How many recent samples go into the style prompt
    pub style_window: usize,

    /// Human-latency delay bounds before sending a reply
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,

    /// Per-call timeout for the generation oracle
    pub oracle_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .context("TELEGRAM_BOT_TOKEN must be set")?;

        let operator_id: i64 = std::env::var("OPERATOR_ID")
            .context("OPERATOR_ID must be set")?
            .trim()
            .parse()
            .context("OPERATOR_ID must be a numeric Telegram user id")?;

        let operator_username = std::env::var("OPERATOR_USERNAME")
            .ok()
            .map(|u| u.trim_start_matches('@').to_string())
            .filter(|u| !u.is_empty());

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY must be set")?;

        let db_path = std::env::var("GHOSTLINE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("ghostline.db"));

        let trigger = std::env::var("GHOSTLINE_TRIGGER").unwrap_or_else(|_| ".ai".to_string());

        let corpus_cap = std::env::var("GHOSTLINE_CORPUS_CAP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let min_sample_chars = std::env::var("GHOSTLINE_MIN_SAMPLE_CHARS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);

        let style_window = std::env::var("GHOSTLINE_STYLE_WINDOW")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(corpus_cap);

        let delay_min_ms = std::env::var("GHOSTLINE_DELAY_MIN_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);

        let delay_max_ms = std::env::var("GHOSTLINE_DELAY_MAX_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4000)
            .max(delay_min_ms);

        let oracle_timeout_secs = std::env::var("GHOSTLINE_ORACLE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        Ok(Self {
            bot_token,
            operator_id,
            operator_username,
            gemini_api_key,
            db_path,
            trigger,
            corpus_cap,
            min_sample_chars,
            style_window,
            delay_min_ms,
            delay_max_ms,
            oracle_timeout_secs,
        })
    }
}
