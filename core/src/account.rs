/// Account hierarchy: the wallet's known accounts, used to decide which
/// stored history belongs to an address.
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountEntry {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Set for derived accounts.
    #[serde(default)]
    pub parent_address: Option<String>,
    /// Hex public key. Shared by every address format of the same account.
    #[serde(default)]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountHierarchy {
    accounts: Vec<AccountEntry>,
}

impl AccountHierarchy {
    pub fn new(accounts: Vec<AccountEntry>) -> Self {
        Self { accounts }
    }

    /// Load the hierarchy from a JSON array. A missing file is an empty
    /// hierarchy; a malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read accounts from {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Invalid accounts JSON in {}", path.display()))
    }

    pub fn accounts(&self) -> &[AccountEntry] {
        &self.accounts
    }

    pub fn find(&self, address: &str) -> Option<&AccountEntry> {
        self.accounts.iter().find(|a| a.address == address)
    }

    /// Accounts derived from `address`.
    pub fn children(&self, address: &str) -> Vec<&AccountEntry> {
        self.accounts
            .iter()
            .filter(|a| a.parent_address.as_deref() == Some(address))
            .collect()
    }

    /// Key under which an address's local history is stored: the
    /// account's public key when known, else the address itself.
    pub fn storage_key(&self, address: &str) -> String {
        self.find(address)
            .and_then(|a| a.public_key.as_deref())
            .map(|pk| pk.trim().to_lowercase())
            .filter(|pk| !pk.is_empty())
            .unwrap_or_else(|| address.to_string())
    }

    /// Display name for an address, if the hierarchy knows one.
    pub fn name_of(&self, address: &str) -> Option<&str> {
        self.find(address).and_then(|a| a.name.as_deref())
    }
}
