#[must_use]
pub fn help_text(command: Option<&str>) -> String {
    match command {
        Some("history") | Some("h") | Some("ls") => {
            "history [all|transfers|staking]\n  Show local and indexed history, newest first.\n  The filter stays active until changed. Staking history is local only.\n  Aliases: h, ls".to_string()
        }
        Some("more") | Some("m") => {
            "more\n  Load the next page of indexed history (25 transfers).\n  Does nothing once everything is loaded or while the staking filter is active.\n  Alias: m".to_string()
        }
        Some("show") | Some("tx") => {
            "show <hash>\n  Show every field of one transaction.\n  Alias: tx".to_string()
        }
        Some("import") => {
            "import <file.json>\n  Append transactions from a JSON array to local history.\n  Transactions already recorded (same hash) are skipped.".to_string()
        }
        Some("address") | Some("addr") => {
            "address <address>\n  Switch to another address. Indexed pages are fetched again.\n  Alias: addr".to_string()
        }
        Some("chain") => {
            "chain <polkadot|kusama|westend>\n  Switch to another chain for the same address.".to_string()
        }
        Some("status") => {
            "status\n  Show address, chain, loaded record counts and paging state.".to_string()
        }
        Some("help") | Some("?") => "help [command]\n  Show help.".to_string(),
        Some("exit") | Some("quit") | Some("q") => {
            "exit\n  Leave the history viewer.\n  Aliases: quit, q".to_string()
        }
        Some(other) => format!("Unknown command: '{other}'. Type 'help' for a list of commands."),
        None => [
            "Commands:",
            "  history [all|transfers|staking]  Show history (h, ls)",
            "  more                             Load the next indexed page (m)",
            "  show <hash>                      Show one transaction (tx)",
            "  import <file.json>               Append records to local history",
            "  address <address>                Switch address (addr)",
            "  chain <name>                     Switch chain",
            "  status                           Show paging state",
            "  help [command]                   Show help",
            "  exit                             Exit (quit, q)",
        ]
        .join("\n"),
    }
}
