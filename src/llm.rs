//! Generation oracle
//!
//! Gemini `generateContent` client. The oracle is a request/response seam:
//! one prompt in, one text out, and any failure is recovered locally with a
//! fallback phrase - the remote party never sees an error.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::sanitize::{next_fallback, sanitize};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Text-generation backend
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Generate a completion for one prompt; may fail or time out
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Oracle for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!("Calling Gemini: model={}, prompt_len={}", self.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {}: {}", status, text);
        }

        let result: GenerateResponse = response.json().await?;

        let text = result
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}

/// A reply ready for dispatch
#[derive(Debug, Clone)]
pub struct GeneratedReply {
    /// Raw oracle output, empty when the call failed
    pub raw: String,
    /// Sanitized text actually sent
    pub cleaned: String,
    /// Whether a fallback phrase was substituted
    pub used_fallback: bool,
}

/// Run one oracle call and turn the outcome into sendable text.
///
/// Failure, timeout, empty output, and sanitizer rejection all collapse into
/// a fallback phrase. Never returns empty text and never errors.
pub async fn generate_reply(oracle: &dyn Oracle, prompt: &str, timeout: Duration) -> GeneratedReply {
    let raw = match tokio::time::timeout(timeout, oracle.generate(prompt)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("Generation failed, using fallback: {}", e);
            String::new()
        }
        Err(_) => {
            warn!("Generation timed out after {:?}, using fallback", timeout);
            String::new()
        }
    };

    match sanitize(&raw) {
        Some(cleaned) => GeneratedReply {
            raw,
            cleaned,
            used_fallback: false,
        },
        None => GeneratedReply {
            raw,
            cleaned: next_fallback().to_string(),
            used_fallback: true,
        },
    }
}
