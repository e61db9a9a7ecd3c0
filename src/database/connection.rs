use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

use super::{StoreError, StoreResult};
use crate::logger::{self, LogTag};

/// SQLite-backed account store
pub struct SqliteAccountStore {
    pub(super) conn: Mutex<Connection>,
}

impl SqliteAccountStore {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Location {
                    path: parent.display().to_string(),
                    message: e.to_string(),
                })?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_tables()?;

        logger::debug(
            LogTag::Database,
            &format!("Opened account database at {}", path.display()),
        );
        Ok(store)
    }

    /// Fresh private database, used by tests and dry tooling
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.initialize_tables()?;
        Ok(store)
    }

    fn initialize_tables(&self) -> StoreResult<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS accounts (
                address TEXT PRIMARY KEY,
                owner_program TEXT,
                balance_lamports INTEGER NOT NULL DEFAULT 0,
                last_active_at INTEGER,
                last_checked INTEGER,
                created_at INTEGER NOT NULL,
                reclaimed_at INTEGER,
                reclaim_tx_signature TEXT,
                error_log TEXT,
                status TEXT NOT NULL DEFAULT 'MONITORING',
                retry_count INTEGER NOT NULL DEFAULT 0,
                tx_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_accounts_status ON accounts(status);
            CREATE INDEX IF NOT EXISTS idx_accounts_created_at ON accounts(created_at);

            CREATE TABLE IF NOT EXISTS event_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                level TEXT NOT NULL,
                message TEXT NOT NULL,
                meta TEXT,
                timestamp INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_event_logs_timestamp ON event_logs(timestamp);",
        )?;

        Ok(())
    }
}
