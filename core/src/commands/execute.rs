use anyhow::{bail, Context, Result};

use super::help::help_text;
use super::Command;
use crate::chain::Chain;
use crate::display;
use crate::record::TransactionRecord;
use crate::remote::TransferSource;
use crate::service::{HistoryService, LoadMore};
use crate::store::HistoryStore;

impl Command {
    /// Execute a command against a history session and return the output.
    pub async fn execute<S, H>(
        &self,
        service: &mut HistoryService<S, H>,
        json_output: bool,
    ) -> Result<String>
    where
        S: TransferSource + 'static,
        H: HistoryStore,
    {
        match self {
            Command::History { filter } => {
                if let Some(f) = filter {
                    service.set_filter(*f);
                }
                Ok(render_visible(service, json_output))
            }

            Command::More => {
                let outcome = service.on_sentinel_visible().await;
                if json_output {
                    return Ok(render_visible(service, true));
                }
                let note = match outcome {
                    LoadMore::Fetched { added } if service.cursor().has_more() => {
                        format!("Loaded {added} transfer(s).")
                    }
                    LoadMore::Fetched { added } => {
                        format!("Loaded {added} transfer(s). All indexed history loaded.")
                    }
                    LoadMore::Busy => "Loading…".to_string(),
                    LoadMore::Exhausted => "All indexed history loaded.".to_string(),
                    LoadMore::LocalOnly => {
                        "Staking history is recorded locally; nothing to fetch.".to_string()
                    }
                };
                Ok(format!("{}\n{note}", render_visible(service, false)))
            }

            Command::Show { hash } => {
                let chain = open_chain(service)?;
                let record = service
                    .find(hash)
                    .with_context(|| format!("No transaction with hash '{hash}' is loaded."))?;
                if json_output {
                    Ok(serde_json::to_string(&record)?)
                } else {
                    Ok(display::format_record_details(&record, &chain))
                }
            }

            Command::Import { path } => {
                let data = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let records: Vec<TransactionRecord> = serde_json::from_str(&data)
                    .with_context(|| format!("Invalid history JSON in {}", path.display()))?;
                if records.iter().any(|r| r.hash.trim().is_empty()) {
                    bail!("Every imported transaction needs a hash.");
                }
                let before = service.merger().local_records().len();
                let wrote = service.append_local(&records)?;
                let added = service.merger().local_records().len() - before;
                if json_output {
                    Ok(serde_json::json!({ "imported": added }).to_string())
                } else if wrote {
                    Ok(format!("Imported {added} transaction(s) into local history."))
                } else {
                    Ok("Nothing new to import.".to_string())
                }
            }

            Command::Address { address } => {
                let chain = service.current_chain().clone();
                service.open(address, &chain)?;
                Ok(format!(
                    "Showing history for {address} on {chain}.\n{}",
                    render_visible(service, json_output)
                ))
            }

            Command::Chain { name } => {
                let chain: Chain = name.parse()?;
                let Some(address) = service.address().map(str::to_string) else {
                    service.set_default_chain(chain.clone());
                    return Ok(format!(
                        "Switched to {chain}. Use 'address <address>' to show history."
                    ));
                };
                service.open(&address, &chain)?;
                Ok(format!(
                    "Switched to {chain}.\n{}",
                    render_visible(service, json_output)
                ))
            }

            Command::Status => {
                let chain = open_chain(service)?;
                let address = service.address().unwrap_or_default();
                let local = service.merger().local_records().len();
                if json_output {
                    Ok(display::format_status_json(
                        address,
                        &chain,
                        local,
                        service.cursor(),
                    ))
                } else {
                    Ok(display::format_status(
                        address,
                        &chain,
                        local,
                        service.cursor(),
                        service.trigger_connected(),
                    ))
                }
            }

            Command::Help { command } => Ok(help_text(command.as_deref())),

            Command::Exit => Ok(String::new()),
        }
    }
}

fn open_chain<S, H>(service: &HistoryService<S, H>) -> Result<Chain>
where
    S: TransferSource + 'static,
    H: HistoryStore,
{
    service
        .chain()
        .cloned()
        .context("No address selected. Use 'address <address>' first.")
}

fn render_visible<S, H>(service: &HistoryService<S, H>, json_output: bool) -> String
where
    S: TransferSource + 'static,
    H: HistoryStore,
{
    let records = service.visible();
    if json_output {
        return display::format_records_json(&records);
    }
    let Some(chain) = service.chain() else {
        return "No address selected. Use 'address <address>' first.".to_string();
    };
    format!(
        "{}\n{}",
        display::format_records(&records, chain),
        display::format_summary(records.len(), service.filter(), service.cursor())
    )
}
