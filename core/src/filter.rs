use crate::record::{TransactionRecord, ACTION_RECEIVE, ACTION_SEND};

/// Staking actions recorded locally by the wallet. Pool actions are matched
/// separately by substring.
pub const STAKING_ACTIONS: &[&str] = &[
    "bond",
    "bond_extra",
    "unbond",
    "rebond",
    "redeem",
    "withdraw_unbonded",
    "nominate",
    "stop_nominating",
    "chill",
    "payout",
    "rebag",
    "reward_destination",
    "tune_up",
];

/// Category tab selection for the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Transfers,
    Staking,
}

impl CategoryFilter {
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        match self {
            Self::All => true,
            Self::Transfers => is_transfer_action(&record.action),
            Self::Staking => is_staking_action(&record.action),
        }
    }

    /// Project `records` down to this category, preserving order.
    pub fn apply(&self, records: Vec<TransactionRecord>) -> Vec<TransactionRecord> {
        match self {
            Self::All => records,
            _ => records.into_iter().filter(|r| self.matches(r)).collect(),
        }
    }
}

pub fn is_transfer_action(action: &str) -> bool {
    action == ACTION_SEND || action == ACTION_RECEIVE
}

/// Case-sensitive: actions are tagged in lowercase when recorded.
pub fn is_staking_action(action: &str) -> bool {
    STAKING_ACTIONS.contains(&action) || action.contains("pool")
}

impl std::str::FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "transfers" | "transfer" | "tx" => Ok(Self::Transfers),
            "staking" | "stake" => Ok(Self::Staking),
            other => Err(format!(
                "Unknown history filter: '{other}'. Use 'all', 'transfers', or 'staking'."
            )),
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Transfers => write!(f, "transfers"),
            Self::Staking => write!(f, "staking"),
        }
    }
}
