/// Command definitions and parsing for the history REPL and one-shot mode.
mod execute;
mod help;
mod parse;

pub use help::help_text;

use std::path::PathBuf;

use crate::filter::CategoryFilter;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Show merged history: history [all|transfers|staking]
    History { filter: Option<CategoryFilter> },
    /// Load the next remote page: more
    More,
    /// Show one transaction by hash: show <hash>
    Show { hash: String },
    /// Append records from a JSON file to local history: import <file>
    Import { path: PathBuf },
    /// Switch to another address: address <address>
    Address { address: String },
    /// Switch to another built-in chain: chain <name>
    Chain { name: String },
    /// Show pagination state
    Status,
    /// Print help
    Help { command: Option<String> },
    /// Exit
    Exit,
}

impl Command {
    /// Whether running this command changes which history is shown.
    pub fn changes_scope(&self) -> bool {
        matches!(self, Command::Address { .. } | Command::Chain { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_changing_commands() {
        assert!(Command::Address {
            address: "5Me".into()
        }
        .changes_scope());
        assert!(Command::Chain {
            name: "kusama".into()
        }
        .changes_scope());
        assert!(!Command::More.changes_scope());
        assert!(!Command::History { filter: None }.changes_scope());
    }
}
