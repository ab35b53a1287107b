//! Domain error type for history operations.

use thiserror::Error;

/// Typed error enum for history operations, allowing callers to tell a
/// storage problem from an indexer problem without inspecting messages.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Local history store failure (SQLite, file I/O).
    #[error("{0}")]
    Storage(String),

    /// A stored history blob could not be parsed.
    #[error("stored history for {chain}/{account} is malformed: {reason}")]
    MalformedHistory {
        chain: String,
        account: String,
        reason: String,
    },

    /// Transport or decoding failure talking to the indexer.
    #[error("{0}")]
    Network(String),

    /// The indexer answered with a non-zero status code.
    #[error("indexer error {code}: {message}")]
    Indexer { code: i64, message: String },

    /// The indexer answered successfully but without a data section.
    #[error("indexer returned no data")]
    NoData,

    /// Unknown chain name or invalid chain descriptor.
    #[error("{0}")]
    InvalidChain(String),

    /// Invalid user input (address, filter, file contents).
    #[error("{0}")]
    InvalidInput(String),

    /// Unexpected error from internal subsystems.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for HistoryError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<reqwest::Error> for HistoryError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

/// Alias for `std::result::Result<T, HistoryError>`.
pub type Result<T> = std::result::Result<T, HistoryError>;
