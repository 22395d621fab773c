//! SQLite-backed secret store.
//!
//! One table, one row per secret.  Reads are destructive: the row is
//! selected and deleted inside a single `BEGIN IMMEDIATE` transaction, so
//! the write lock is held before the read happens and a second taker on
//! any connection to the same file has to wait until the row is gone.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use zeroize::Zeroizing;

use super::{SecretStore, TakenSecret};
use crate::crypto::SecretKey;
use crate::errors::{OnceSecretError, Result};

/// Uniqueness on `fkey` and `value` mirrors the handle constraint: no two
/// records may ever share cryptographic material.
const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS secrets (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    handle    TEXT UNIQUE NOT NULL,
    fkey      BLOB UNIQUE NOT NULL,
    value     BLOB UNIQUE NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);";

/// SQLite secret store.
pub struct SqliteStore {
    conn: Mutex<Connection>,

    /// `None` for in-memory databases.
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    ///
    /// `busy_timeout` bounds how long a transaction waits for another
    /// connection's write lock before failing with a storage error.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        // Create the file owner-only before SQLite touches it.
        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .mode(0o600)
                .open(path)?;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| storage_error(&format!("open {}", path.display()), e))?;

        conn.busy_timeout(busy_timeout)
            .map_err(|e| storage_error("busy timeout", e))?;

        tracing::debug!(path = %path.display(), "opened secret store");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| storage_error("open in-memory", e))?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Path of the database file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of secrets still waiting to be retrieved.
    pub fn pending_count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM secrets WHERE is_active = 1",
                [],
                |row| row.get(0),
            )
            .map_err(|e| storage_error("count", e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| OnceSecretError::Storage("connection lock poisoned".into()))
    }
}

impl SecretStore for SqliteStore {
    fn create_table(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| storage_error("create table", e))
    }

    fn insert(&self, handle: &str, key: &SecretKey, ciphertext: &[u8]) -> Result<()> {
        let conn = self.lock()?;
        let result = conn.execute(
            "INSERT INTO secrets (handle, fkey, value, is_active) VALUES (?1, ?2, ?3, 1)",
            params![handle, &key.as_bytes()[..], ciphertext],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_handle(&e) => Err(OnceSecretError::DuplicateHandle),
            Err(e) => Err(storage_error("insert", e)),
        }
    }

    fn take_by_handle(&self, handle: &str) -> Result<Option<TakenSecret>> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| storage_error("begin", e))?;

        let row: Option<(i64, Vec<u8>, Vec<u8>)> = tx
            .query_row(
                "SELECT id, fkey, value FROM secrets WHERE handle = ?1 AND is_active = 1",
                params![handle],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(|e| storage_error("select", e))?;

        // Dropping `tx` rolls back the empty transaction.
        let Some((id, raw_key, ciphertext)) = row else {
            return Ok(None);
        };
        let raw_key = Zeroizing::new(raw_key);

        let deleted = tx
            .execute("DELETE FROM secrets WHERE id = ?1", params![id])
            .map_err(|e| storage_error("delete", e))?;
        if deleted != 1 {
            return Ok(None);
        }

        tx.commit().map_err(|e| storage_error("commit", e))?;

        // The row is gone either way; a malformed key surfaces as an
        // integrity failure to the caller.
        let key = SecretKey::from_slice(&raw_key)?;
        Ok(Some(TakenSecret { key, ciphertext }))
    }
}

/// A unique-constraint failure on the handle column.
fn is_duplicate_handle(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, Some(msg)) => {
            err.code == ErrorCode::ConstraintViolation && msg.contains("secrets.handle")
        }
        _ => false,
    }
}

fn storage_error(context: &str, e: rusqlite::Error) -> OnceSecretError {
    OnceSecretError::Storage(format!("{context}: {e}"))
}
