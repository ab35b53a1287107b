use std::path::PathBuf;

use anyhow::Context;

pub mod account;
pub mod chain;
pub mod commands;
pub mod cursor;
pub mod display;
pub mod error;
pub mod filter;
pub mod merger;
pub mod record;
pub mod remote;
pub mod service;
pub mod store;
pub mod task;
pub mod trigger;

pub use account::{AccountEntry, AccountHierarchy};
pub use chain::Chain;
pub use commands::Command;
pub use cursor::{FetchCursor, PageOutcome, PAGE_SIZE};
pub use error::HistoryError;
pub use filter::CategoryFilter;
pub use merger::{HistoryMerger, HistoryScope};
pub use record::{remap, RawRemoteRecord, TransactionRecord};
pub use remote::{SubscanClient, TransferPage, TransferSource};
pub use service::{HistoryService, LoadMore};
pub use store::{HistoryStore, SqliteHistoryStore};
pub use task::{FetchTask, PageResult, PageTicket};
pub use trigger::{TriggerAction, VisibilityTrigger};

/// XDG-compliant data directory for the history database and accounts.
/// Linux: `~/.local/share/dot-history/`, macOS: `~/Library/Application Support/dot-history/`
pub fn data_dir() -> anyhow::Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("Cannot determine data directory")?
        .join("dot-history");
    Ok(dir)
}
