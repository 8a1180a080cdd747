//! Dispatch coordination
//!
//! Per-event delivery sequence: typing presence, a jittered human-latency
//! delay, then the send. Each delivery runs in its own spawned task so one
//! event's delay never blocks another event's classification or command
//! handling. Tasks are tracked so shutdown can drain or abandon them.

use async_trait::async_trait;
use rand::Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Error types at the transport seam
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("presence failed: {0}")]
    PresenceFailed(String),

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("edit failed: {0}")]
    EditFailed(String),
}

/// Outbound side of the messaging platform
#[async_trait]
pub trait Transport: Send + Sync {
    /// Emit a composing/typing presence signal on a conversation
    async fn send_presence(&self, chat_id: i64) -> Result<(), TransportError>;

    /// Send text, optionally quoting an earlier message
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        quote: Option<i32>,
    ) -> Result<(), TransportError>;

    /// Edit an existing message (command acknowledgments edit the
    /// operator's own triggering message)
    async fn edit_message(
        &self,
        chat_id: i64,
        event_id: i32,
        text: &str,
    ) -> Result<(), TransportError>;
}

/// Sequences presence, delay, and send for each outgoing reply
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    delay_min_ms: u64,
    delay_max_ms: u64,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, delay_min_ms: u64, delay_max_ms: u64) -> Self {
        Self {
            transport,
            delay_min_ms,
            delay_max_ms: delay_max_ms.max(delay_min_ms),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Spawn the delivery task for one reply: presence, delay, send.
    ///
    /// Transport failures are logged and the event is treated as complete;
    /// there are no retries (at-most-once delivery).
    pub fn spawn_delivery(&self, chat_id: i64, text: String, quote: Option<i32>) {
        let transport = Arc::clone(&self.transport);
        let delay = self.jitter();

        let handle = tokio::spawn(async move {
            if let Err(e) = transport.send_presence(chat_id).await {
                warn!("Presence signal failed for chat {}: {}", chat_id, e);
            }

            tokio::time::sleep(delay).await;

            match transport.send_message(chat_id, &text, quote).await {
                Ok(()) => debug!("Reply delivered to chat {} ({} chars)", chat_id, text.len()),
                Err(e) => warn!("Send failed for chat {}: {}", chat_id, e),
            }
        });

        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }

    /// Await all currently tracked deliveries (tests, graceful shutdown)
    pub async fn drain(&self) {
        loop {
            let handle = {
                let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
                in_flight.pop()
            };
            match handle {
                Some(h) => {
                    let _ = h.await;
                }
                None => break,
            }
        }
    }

    /// Abandon in-flight deliveries, returning how many were cancelled.
    ///
    /// Losing a reply mid-dispatch is accepted: delivery is at-most-once.
    pub fn abort_in_flight(&self) -> usize {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        let mut aborted = 0;
        for handle in in_flight.drain(..) {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }
        aborted
    }

    fn jitter(&self) -> Duration {
        let ms = if self.delay_min_ms == self.delay_max_ms {
            self.delay_min_ms
        } else {
            rand::thread_rng().gen_range(self.delay_min_ms..=self.delay_max_ms)
        };
        Duration::from_millis(ms)
    }
}
