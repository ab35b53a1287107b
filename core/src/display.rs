/// Output formatting for history records, cursor state and counts.
use chrono::{TimeZone, Utc};
use num_format::{Locale, ToFormattedString};

use crate::account::AccountHierarchy;
use crate::chain::Chain;
use crate::cursor::FetchCursor;
use crate::filter::CategoryFilter;
use crate::record::TransactionRecord;

/// Format a millisecond timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
#[must_use]
pub fn format_date(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

/// Shorten an address to `head…tail` for table output.
#[must_use]
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 14 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}…{tail}")
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// The counterparty column: who the record was sent to, or received from.
fn counterparty(record: &TransactionRecord) -> String {
    match record.action.as_str() {
        "receive" => short_address(or_dash(&record.from)),
        _ => short_address(or_dash(&record.to)),
    }
}

/// Format records as one line each.
#[must_use]
pub fn format_records(records: &[TransactionRecord], chain: &Chain) -> String {
    if records.is_empty() {
        return "No transactions found.".to_string();
    }

    let mut lines = Vec::with_capacity(records.len());
    for r in records {
        let amount = if r.amount.is_empty() {
            "-".to_string()
        } else {
            format!("{} {}", r.amount, r.token.as_deref().unwrap_or(&chain.token))
        };
        let status = if r.is_success() { "" } else { "  [failed]" };
        lines.push(format!(
            "{}  {:<18}  {:<13}  {:>20}  {}{status}",
            format_date(r.date),
            r.action,
            counterparty(r),
            amount,
            r.hash,
        ));
    }
    lines.join("\n")
}

/// Format a single record with every field.
#[must_use]
pub fn format_record_details(record: &TransactionRecord, chain: &Chain) -> String {
    let mut lines = vec![
        format!("Hash:    {}", record.hash),
        format!("Action:  {}", record.action),
        format!("Status:  {}", record.status),
        format!("Date:    {}", format_date(record.date)),
        format!(
            "Block:   {}",
            record
                .block
                .map(|b| b.to_formatted_string(&Locale::en))
                .unwrap_or_else(|| "-".to_string())
        ),
        format!("From:    {}", or_dash(&record.from)),
        format!("To:      {}", or_dash(&record.to)),
        format!(
            "Amount:  {} {}",
            or_dash(&record.amount),
            record.token.as_deref().unwrap_or(&chain.token)
        ),
        format!("Fee:     {}", or_dash(&record.fee)),
    ];
    if let Some(sub) = &record.sub_action {
        lines.push(format!("Detail:  {sub}"));
    }
    if let Some(friends) = &record.friends {
        lines.push(format!("Friends: {}", friends.join(", ")));
    }
    lines.join("\n")
}

/// One-line summary of what is loaded.
#[must_use]
pub fn format_summary(shown: usize, filter: CategoryFilter, cursor: &FetchCursor) -> String {
    let remote = if cursor.is_fetching() {
        "loading…".to_string()
    } else if cursor.has_more() {
        "more available ('more')".to_string()
    } else {
        "all loaded".to_string()
    };
    format!(
        "{} transaction(s) [{filter}], {} remote page(s) fetched, {remote}",
        shown.to_formatted_string(&Locale::en),
        cursor.page_number(),
    )
}

/// Format pagination state for the `status` command.
#[must_use]
pub fn format_status(
    address: &str,
    chain: &Chain,
    local: usize,
    cursor: &FetchCursor,
    trigger_connected: bool,
) -> String {
    [
        format!("Address:        {address}"),
        format!("Chain:          {} ({})", chain.name, chain.genesis_hash),
        format!(
            "Indexer:        {}",
            chain.indexer_url.as_deref().unwrap_or("none")
        ),
        format!("Local records:  {}", local.to_formatted_string(&Locale::en)),
        format!(
            "Remote records: {}",
            cursor.accumulated().len().to_formatted_string(&Locale::en)
        ),
        format!("Next page:      {}", cursor.page_number()),
        format!("Fetching:       {}", cursor.is_fetching()),
        format!("Has more:       {}", cursor.has_more()),
        format!("Trigger:        {}", if trigger_connected { "connected" } else { "disconnected" }),
    ]
    .join("\n")
}

/// Known accounts as a tree: top-level accounts with their derived
/// accounts indented below.
#[must_use]
pub fn format_accounts(hierarchy: &AccountHierarchy) -> String {
    let mut lines = Vec::new();
    for entry in hierarchy.accounts() {
        let has_parent = entry
            .parent_address
            .as_deref()
            .is_some_and(|p| hierarchy.find(p).is_some());
        if has_parent {
            continue;
        }
        lines.push(format!(
            "  {:<20} {}",
            entry.name.as_deref().unwrap_or("-"),
            entry.address
        ));
        for child in hierarchy.children(&entry.address) {
            lines.push(format!(
                "    {:<18} {}",
                child.name.as_deref().unwrap_or("-"),
                child.address
            ));
        }
    }
    lines.join("\n")
}

#[must_use]
pub fn format_records_json(records: &[TransactionRecord]) -> String {
    serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
}

#[must_use]
pub fn format_status_json(address: &str, chain: &Chain, local: usize, cursor: &FetchCursor) -> String {
    serde_json::json!({
        "address": address,
        "chain": chain.name,
        "genesis_hash": chain.genesis_hash,
        "local_records": local,
        "remote_records": cursor.accumulated().len(),
        "page_number": cursor.page_number(),
        "is_fetching": cursor.is_fetching(),
        "has_more": cursor.has_more(),
    })
    .to_string()
}
