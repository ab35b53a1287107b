/// Chain descriptors: which network a history belongs to and where its
/// indexer lives.
use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};

pub const POLKADOT_GENESIS: &str =
    "0x91b171bb158e2d3848fa23a9f1c25182fb8e20313b2c1eb49219da7a70ce90c3";
pub const KUSAMA_GENESIS: &str =
    "0xb0a8d493285c2df73290dfb7e61f870f17b41801197a149ca93654499ea3dafe";
pub const WESTEND_GENESIS: &str =
    "0xe143f23803ac50e8f6f8e62695d1ce9e4e1d68aa36c1cd2cfd15340213f3423e";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub name: String,
    /// Storage key for local history; stable across address formats.
    pub genesis_hash: String,
    pub token: String,
    pub decimals: u8,
    pub indexer_url: Option<String>,
}

impl Chain {
    pub fn polkadot() -> Self {
        Self {
            name: "polkadot".into(),
            genesis_hash: POLKADOT_GENESIS.into(),
            token: "DOT".into(),
            decimals: 10,
            indexer_url: Some("https://polkadot.api.subscan.io".into()),
        }
    }

    pub fn kusama() -> Self {
        Self {
            name: "kusama".into(),
            genesis_hash: KUSAMA_GENESIS.into(),
            token: "KSM".into(),
            decimals: 12,
            indexer_url: Some("https://kusama.api.subscan.io".into()),
        }
    }

    pub fn westend() -> Self {
        Self {
            name: "westend".into(),
            genesis_hash: WESTEND_GENESIS.into(),
            token: "WND".into(),
            decimals: 12,
            indexer_url: Some("https://westend.api.subscan.io".into()),
        }
    }

    /// Look up a built-in chain by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "polkadot" | "dot" => Some(Self::polkadot()),
            "kusama" | "ksm" => Some(Self::kusama()),
            "westend" | "wnd" => Some(Self::westend()),
            _ => None,
        }
    }

    /// Build a chain that is not built in. Requires a 0x-prefixed 32-byte
    /// genesis hash so local history stays keyed consistently.
    pub fn custom(name: &str, genesis_hash: &str, indexer_url: Option<String>) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HistoryError::InvalidChain("Chain name cannot be empty.".into()));
        }
        let genesis = genesis_hash.trim().to_lowercase();
        let valid = genesis.len() == 66
            && genesis.starts_with("0x")
            && genesis[2..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(HistoryError::InvalidChain(format!(
                "Invalid genesis hash '{genesis_hash}'. Expected 0x followed by 64 hex characters."
            )));
        }
        Ok(Self {
            name: name.to_string(),
            genesis_hash: genesis,
            token: "UNIT".into(),
            decimals: 12,
            indexer_url,
        })
    }

    pub fn with_indexer_url(mut self, url: Option<String>) -> Self {
        if url.is_some() {
            self.indexer_url = url;
        }
        self
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl std::str::FromStr for Chain {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::by_name(s).ok_or_else(|| {
            HistoryError::InvalidChain(format!(
                "Unknown chain '{s}'. Use 'polkadot', 'kusama', 'westend', or pass --genesis-hash."
            ))
        })
    }
}

/// Reject non-HTTPS indexer URLs unless `allow_insecure` is set.
pub fn validate_indexer_url(url: &str, allow_insecure: bool) -> Result<()> {
    if url.starts_with("https://") {
        return Ok(());
    }
    if url.starts_with("http://") {
        if allow_insecure {
            return Ok(());
        }
        return Err(HistoryError::InvalidInput(format!(
            "Refusing to connect over plain HTTP: {url}\nUse --insecure to allow unencrypted connections."
        )));
    }
    Err(HistoryError::InvalidInput(format!(
        "Invalid indexer URL scheme: {url}\nExpected an https:// URL."
    )))
}
