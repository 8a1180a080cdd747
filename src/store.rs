//! Ghost Mode State Store
//!
//! Single persisted boolean with SQLite backend. The flag must survive
//! restarts: a process-local bool would silently reset the agent to OFF.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

/// Persisted ghost-mode flag
///
/// A missing row reads as OFF. The row is created lazily on the first toggle.
pub struct ModeStore {
    conn: Connection,
}

impl ModeStore {
    /// Open or create the mode database
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;

        info!("Mode store opened: {}", path.display());
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA busy_timeout = 5000;

            CREATE TABLE IF NOT EXISTS ghost_mode (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                active INTEGER NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (unixepoch())
            );
            "#,
        )?;
        Ok(())
    }

    /// Current flag value; absent row means OFF
    pub fn get(&self) -> Result<bool> {
        let active: Option<i64> = self
            .conn
            .query_row("SELECT active FROM ghost_mode WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(active.map(|v| v != 0).unwrap_or(false))
    }

    /// Set the flag; idempotent, last write wins
    pub fn set(&self, active: bool) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO ghost_mode (id, active, updated_at)
            VALUES (1, ?1, unixepoch())
            ON CONFLICT(id) DO UPDATE SET
                active = excluded.active,
                updated_at = excluded.updated_at
            "#,
            params![active as i64],
        )?;

        debug!("Ghost mode set: {}", active);
        Ok(())
    }
}
