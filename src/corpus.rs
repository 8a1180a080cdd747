//! Style Corpus
//!
//! Rolling window of the operator's own outgoing messages, used to bias
//! generated replies toward their writing style. Bounded: inserting past the
//! cap evicts the oldest sample in the same transaction.

use anyhow::Result;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{debug, info};

/// Default maximum samples kept
const DEFAULT_CAP: usize = 30;

/// Default minimum characters for a message to qualify as a sample
const DEFAULT_MIN_CHARS: usize = 2;

/// Style description used when the corpus is empty
pub const DEFAULT_STYLE: &str = "Casual, short, friendly messages.";

/// Bounded log of operator style samples with SQLite backend
pub struct StyleCorpus {
    conn: Connection,
    cap: usize,
    min_chars: usize,
    trigger: String,
}

impl StyleCorpus {
    /// Open or create the corpus database with default limits
    pub fn open(path: &Path, trigger: &str) -> Result<Self> {
        Self::open_with_config(path, trigger, DEFAULT_CAP, DEFAULT_MIN_CHARS)
    }

    /// Open with custom cap and minimum sample length
    pub fn open_with_config(
        path: &Path,
        trigger: &str,
        cap: usize,
        min_chars: usize,
    ) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let corpus = Self {
            conn,
            cap: cap.max(1),
            min_chars,
            trigger: trigger.to_string(),
        };
        corpus.init_schema()?;

        info!("Style corpus opened: {} (cap {})", path.display(), corpus.cap);
        Ok(corpus)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA busy_timeout = 5000;

            CREATE TABLE IF NOT EXISTS style_samples (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                recorded_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_style_samples_recorded
                ON style_samples(recorded_at DESC);
            "#,
        )?;
        Ok(())
    }

    /// Record an outgoing operator message as a style sample.
    ///
    /// Returns `true` if the sample was stored. Empty text, text starting
    /// with the command trigger, and text below the minimum length are
    /// skipped. Insert and eviction happen in one transaction so the cap
    /// holds once the call returns.
    pub fn record(&self, text: &str) -> Result<bool> {
        let text = text.trim();
        if text.is_empty()
            || text.chars().count() < self.min_chars
            || starts_with_ignore_case(text, &self.trigger)
        {
            return Ok(false);
        }

        let recorded_at = chrono::Utc::now().timestamp_millis();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO style_samples (text, recorded_at) VALUES (?1, ?2)",
            params![text, recorded_at],
        )?;
        tx.execute(
            "DELETE FROM style_samples
             WHERE id NOT IN (
                 SELECT id FROM style_samples
                 ORDER BY recorded_at DESC, id DESC
                 LIMIT ?1
             )",
            params![self.cap],
        )?;
        tx.commit()?;

        debug!("Recorded style sample ({} chars)", text.len());
        Ok(true)
    }

    /// Most recent `n` samples, newest first, joined into a style block.
    ///
    /// An empty corpus yields [`DEFAULT_STYLE`]. Output depends only on
    /// current corpus contents.
    pub fn style_block(&self, n: usize) -> Result<String> {
        let mut stmt = self.conn.prepare(
            "SELECT text FROM style_samples
             ORDER BY recorded_at DESC, id DESC
             LIMIT ?1",
        )?;

        let samples: Vec<String> = stmt
            .query_map(params![n.min(self.cap)], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        if samples.is_empty() {
            return Ok(DEFAULT_STYLE.to_string());
        }

        Ok(samples.join("\n"))
    }

    /// Purge all samples, returning the number removed
    pub fn clear(&self) -> Result<usize> {
        let rows = self.conn.execute("DELETE FROM style_samples", [])?;
        info!("Cleared {} style samples", rows);
        Ok(rows)
    }

    /// Current sample count
    pub fn len(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM style_samples", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}
