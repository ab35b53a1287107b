/// SQLite-backed local history, shared across accounts.
///
/// Each (chain, account) pair owns one JSON array of records, appended to
/// by the wallet after it submits a transaction.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::account::AccountHierarchy;
use crate::chain::Chain;
use crate::error::{HistoryError, Result};
use crate::record::TransactionRecord;

/// Persistence collaborator for locally recorded history.
pub trait HistoryStore {
    /// Read the stored history for `address` on `chain`. No stored history
    /// is an empty list.
    fn load_local_history(
        &self,
        chain: &Chain,
        hierarchy: &AccountHierarchy,
        address: &str,
    ) -> Result<Vec<TransactionRecord>>;

    /// Append records to the stored history. Records whose hash is already
    /// stored are skipped. Returns whether anything was written.
    fn append_local_history(
        &self,
        chain: &Chain,
        hierarchy: &AccountHierarchy,
        address: &str,
        records: &[TransactionRecord],
    ) -> Result<bool>;
}

pub struct SqliteHistoryStore {
    conn: Connection,
}

/// Default DB location: platform data directory + `dot-history/history.db`
fn default_db_path() -> anyhow::Result<PathBuf> {
    Ok(crate::data_dir()?.join("history.db"))
}

impl SqliteHistoryStore {
    /// Open (or create) the store at the default data directory.
    pub fn open() -> Result<Self> {
        Self::open_at(&default_db_path()?)
    }

    /// Open (or create) the store at a specific path.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create history directory")?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))
                    .context("Failed to restrict history directory")?;
            }
        }
        let conn = Connection::open(path).context("Failed to open history database")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .context("Failed to restrict history database")?;
        }
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS local_history (
                chain       TEXT    NOT NULL,
                account     TEXT    NOT NULL,
                blob        TEXT    NOT NULL,
                updated_at  INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (chain, account)
            );",
            )
            .context("Failed to initialize history schema")?;
        Ok(())
    }

    fn read_blob(&self, chain: &str, account: &str) -> Result<Option<String>> {
        let blob = self
            .conn
            .query_row(
                "SELECT blob FROM local_history WHERE chain = ?1 AND account = ?2",
                params![chain, account],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(blob)
    }

    /// Write a raw blob, bypassing validation. Used to simulate storage
    /// written by older clients.
    #[cfg(test)]
    fn write_raw(&self, chain: &str, account: &str, blob: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO local_history (chain, account, blob) VALUES (?1, ?2, ?3)",
            params![chain, account, blob],
        )?;
        Ok(())
    }
}

/// Parse a stored blob. Repeated hashes (written by older clients) are
/// dropped, keeping the first.
fn parse_blob(chain: &Chain, account: &str, blob: &str) -> Result<Vec<TransactionRecord>> {
    let mut records: Vec<TransactionRecord> =
        serde_json::from_str(blob).map_err(|e| HistoryError::MalformedHistory {
            chain: chain.name.clone(),
            account: account.to_string(),
            reason: e.to_string(),
        })?;
    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.hash.clone()));
    Ok(records)
}

impl HistoryStore for SqliteHistoryStore {
    fn load_local_history(
        &self,
        chain: &Chain,
        hierarchy: &AccountHierarchy,
        address: &str,
    ) -> Result<Vec<TransactionRecord>> {
        let account = hierarchy.storage_key(address);
        match self.read_blob(&chain.genesis_hash, &account)? {
            Some(blob) => parse_blob(chain, &account, &blob),
            None => Ok(Vec::new()),
        }
    }

    fn append_local_history(
        &self,
        chain: &Chain,
        hierarchy: &AccountHierarchy,
        address: &str,
        records: &[TransactionRecord],
    ) -> Result<bool> {
        if records.is_empty() {
            return Ok(false);
        }
        let account = hierarchy.storage_key(address);

        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        // A malformed blob is an error here, not an empty list: appending
        // would overwrite whatever the user still has.
        let mut existing = match self.read_blob(&chain.genesis_hash, &account)? {
            Some(blob) => parse_blob(chain, &account, &blob)?,
            None => Vec::new(),
        };

        let mut seen: HashSet<String> = existing.iter().map(|r| r.hash.clone()).collect();
        let before = existing.len();
        for record in records {
            if seen.insert(record.hash.clone()) {
                existing.push(record.clone());
            }
        }
        if existing.len() == before {
            debug!(chain = %chain.name, account = %account, "no new local records to append");
            return Ok(false);
        }

        let blob = serde_json::to_string(&existing).context("Failed to serialize history")?;
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64;

        tx.execute(
            "INSERT INTO local_history (chain, account, blob, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (chain, account) DO UPDATE SET
                 blob = excluded.blob,
                 updated_at = excluded.updated_at",
            params![chain.genesis_hash, account, blob, now],
        )
        .context("Failed to write local history")?;
        tx.commit().context("Failed to commit local history")?;

        debug!(
            chain = %chain.name,
            account = %account,
            added = existing.len() - before,
            "appended local history"
        );
        Ok(true)
    }
}
