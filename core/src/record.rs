use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILED: &str = "failed";

pub const ACTION_SEND: &str = "send";
pub const ACTION_RECEIVE: &str = "receive";

/// One historical transaction as shown to the user.
///
/// Local records are written by the wallet after it submits a transaction
/// and may carry detail the indexer cannot reconstruct (recovery friends,
/// sub-actions). Remote records are produced by [`remap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub action: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub block: Option<u64>,
    /// Milliseconds since the Unix epoch.
    pub date: i64,
    #[serde(default)]
    pub fee: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub hash: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friends: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl TransactionRecord {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// A transfer as returned by the indexer. `block_timestamp` is in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRemoteRecord {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub amount: String,
    pub block_num: u64,
    pub block_timestamp: i64,
    #[serde(default)]
    pub fee: String,
    pub hash: String,
    pub success: bool,
}

/// Map an indexer transfer into a [`TransactionRecord`] from the point of
/// view of `address`.
pub fn remap(raw: &RawRemoteRecord, address: &str) -> TransactionRecord {
    let action = if raw.from == address {
        ACTION_SEND
    } else {
        ACTION_RECEIVE
    };
    let status = if raw.success {
        STATUS_SUCCESS
    } else {
        STATUS_FAILED
    };

    TransactionRecord {
        action: action.to_string(),
        amount: raw.amount.clone(),
        block: Some(raw.block_num),
        date: raw.block_timestamp.saturating_mul(1000),
        fee: raw.fee.clone(),
        from: raw.from.clone(),
        to: raw.to.clone(),
        hash: raw.hash.clone(),
        status: status.to_string(),
        sub_action: None,
        friends: None,
        token: None,
    }
}
