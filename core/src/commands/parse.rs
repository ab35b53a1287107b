use std::path::PathBuf;

use anyhow::{bail, Result};

use super::Command;
use crate::filter::CategoryFilter;

impl Command {
    /// Parse a command from a raw input string.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("No command entered. Type 'help' for a list of commands.");
        }

        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), Some(rest.trim()).filter(|r| !r.is_empty())),
            None => (input.to_lowercase(), None),
        };

        match cmd.as_str() {
            "history" | "h" | "ls" => {
                let filter = match rest {
                    Some(s) => Some(s.parse::<CategoryFilter>().map_err(anyhow::Error::msg)?),
                    None => None,
                };
                Ok(Command::History { filter })
            }

            "more" | "m" => Ok(Command::More),

            "show" | "tx" => {
                let hash = rest.ok_or_else(|| {
                    anyhow::anyhow!("Missing transaction hash. Usage: show <hash>")
                })?;
                Ok(Command::Show {
                    hash: hash.to_string(),
                })
            }

            "import" => {
                let path = rest.ok_or_else(|| {
                    anyhow::anyhow!("Missing file path. Usage: import <file.json>")
                })?;
                Ok(Command::Import {
                    path: PathBuf::from(path),
                })
            }

            "address" | "addr" => {
                let address = rest.ok_or_else(|| {
                    anyhow::anyhow!("Missing address. Usage: address <address>")
                })?;
                if address.contains(char::is_whitespace) {
                    bail!("Invalid address '{address}'. Addresses cannot contain spaces.");
                }
                Ok(Command::Address {
                    address: address.to_string(),
                })
            }

            "chain" => {
                let name = rest
                    .ok_or_else(|| anyhow::anyhow!("Missing chain. Usage: chain <name>"))?;
                Ok(Command::Chain {
                    name: name.to_lowercase(),
                })
            }

            "status" => Ok(Command::Status),

            "help" | "?" => Ok(Command::Help {
                command: rest.map(|s| s.to_lowercase()),
            }),

            "exit" | "quit" | "q" => Ok(Command::Exit),

            other => bail!("Unknown command: '{other}'. Type 'help' for a list of commands."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert!(Command::parse("   ").is_err());
    }

    #[test]
    fn history_with_and_without_filter() {
        assert_eq!(
            Command::parse("history").unwrap(),
            Command::History { filter: None }
        );
        assert_eq!(
            Command::parse("h staking").unwrap(),
            Command::History {
                filter: Some(CategoryFilter::Staking)
            }
        );
        assert_eq!(
            Command::parse("LS Transfers").unwrap(),
            Command::History {
                filter: Some(CategoryFilter::Transfers)
            }
        );
        let err = Command::parse("history nfts").unwrap_err();
        assert!(err.to_string().contains("Unknown history filter"));
    }

    #[test]
    fn more_aliases() {
        assert_eq!(Command::parse("more").unwrap(), Command::More);
        assert_eq!(Command::parse("m").unwrap(), Command::More);
    }

    #[test]
    fn show_requires_hash() {
        assert!(Command::parse("show").is_err());
        assert_eq!(
            Command::parse("tx 0xAbC").unwrap(),
            Command::Show {
                hash: "0xAbC".into()
            }
        );
    }

    #[test]
    fn import_keeps_path_with_spaces() {
        assert_eq!(
            Command::parse("import /tmp/my history.json").unwrap(),
            Command::Import {
                path: PathBuf::from("/tmp/my history.json")
            }
        );
    }

    #[test]
    fn address_and_chain() {
        assert_eq!(
            Command::parse("addr 5GrwvaEF").unwrap(),
            Command::Address {
                address: "5GrwvaEF".into()
            }
        );
        assert!(Command::parse("address a b").is_err());
        assert_eq!(
            Command::parse("chain Kusama").unwrap(),
            Command::Chain {
                name: "kusama".into()
            }
        );
    }

    #[test]
    fn help_and_exit() {
        assert_eq!(
            Command::parse("help more").unwrap(),
            Command::Help {
                command: Some("more".into())
            }
        );
        assert_eq!(Command::parse("q").unwrap(), Command::Exit);
        assert!(Command::parse("frobnicate").is_err());
    }
}
