mod repl;

use anyhow::{Context, Result};
use clap::Parser;
use dot_history_core::chain::validate_indexer_url;
use dot_history_core::remote::DEFAULT_TIMEOUT;
use dot_history_core::{
    AccountHierarchy, Chain, Command, HistoryService, SqliteHistoryStore, SubscanClient,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub(crate) type Service = HistoryService<SubscanClient, SqliteHistoryStore>;

#[derive(Parser)]
#[command(
    name = "dot-history",
    about = "Transaction history viewer for Polkadot-family chains",
    version
)]
pub(crate) struct Cli {
    /// Account address to show history for
    #[arg(long)]
    address: Option<String>,

    /// Chain name: polkadot, kusama or westend (default: polkadot)
    #[arg(long, default_value = "polkadot")]
    chain: String,

    /// Genesis hash of a chain that is not built in (used with --chain as its name)
    #[arg(long)]
    genesis_hash: Option<String>,

    /// Override the chain's indexer base URL
    #[arg(long, env = "DOT_HISTORY_INDEXER_URL")]
    indexer_url: Option<String>,

    /// Indexer API key
    #[arg(long, env = "SUBSCAN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Data directory (default: platform data dir + /dot-history)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Account hierarchy file (default: <data dir>/accounts.json)
    #[arg(long)]
    accounts: Option<PathBuf>,

    /// Run a single command and exit
    #[arg(long)]
    cmd: Option<String>,

    /// Output in JSON format (useful with --cmd)
    #[arg(long)]
    json: bool,

    /// Allow non-HTTPS indexer URLs
    #[arg(long)]
    insecure: bool,

    /// Indexer request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,
}

impl Cli {
    fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dot_history_core::data_dir(),
        }
    }

    fn accounts_path(&self) -> Result<PathBuf> {
        match &self.accounts {
            Some(path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join("accounts.json")),
        }
    }

    /// Resolve the chain from `--chain`, `--genesis-hash` and `--indexer-url`.
    pub(crate) fn resolve_chain(&self) -> Result<Chain> {
        let chain = match &self.genesis_hash {
            Some(genesis) => Chain::custom(&self.chain, genesis, None)?,
            None => self.chain.parse::<Chain>()?,
        };
        let chain = chain.with_indexer_url(self.indexer_url.clone());
        if let Some(url) = &chain.indexer_url {
            validate_indexer_url(url, self.insecure)?;
        }
        Ok(chain)
    }

    /// Build a history session from the flags, opening `--address` if given.
    pub(crate) fn build_service(&self) -> Result<Service> {
        let chain = self.resolve_chain()?;
        let client = SubscanClient::new(
            self.api_key.clone(),
            Duration::from_secs(self.timeout_secs.max(1)),
            self.insecure,
        )?;
        let store = SqliteHistoryStore::open_at(&self.data_dir()?.join("history.db"))
            .context("Failed to open local history database")?;
        let accounts = self.accounts_path()?;
        let hierarchy = AccountHierarchy::load(&accounts)
            .with_context(|| format!("Failed to load accounts from {}", accounts.display()))?;

        debug!(
            chain = %chain.name,
            indexer = chain.indexer_url.as_deref().unwrap_or("none"),
            accounts = hierarchy.accounts().len(),
            "history session configured"
        );

        let mut service = HistoryService::new(Arc::new(client), store, hierarchy)
            .with_default_chain(chain.clone());
        if let Some(address) = &self.address {
            service.open(address, &chain)?;
        }
        Ok(service)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Some(cmd_str) = &cli.cmd {
        // One-shot mode
        run_oneshot(&cli, cmd_str).await
    } else {
        // REPL mode
        repl::run_repl(&cli).await
    }
}

async fn run_oneshot(cli: &Cli, cmd_str: &str) -> Result<()> {
    let command = Command::parse(cmd_str)?;
    if command == Command::Exit {
        return Ok(());
    }

    let mut service = cli.build_service()?;
    if service.address().is_none() && !matches!(command, Command::Help { .. }) {
        anyhow::bail!("No address given. Use --address <address>.");
    }

    let output = command.execute(&mut service, cli.json).await?;
    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dot-history").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn default_chain_is_polkadot() {
        let chain = parse(&[]).resolve_chain().unwrap();
        assert_eq!(chain.name, "polkadot");
        assert_eq!(chain.token, "DOT");
    }

    #[test]
    fn indexer_override_must_be_https() {
        let cli = parse(&["--chain", "kusama", "--indexer-url", "http://localhost:8080"]);
        assert!(cli.resolve_chain().is_err());

        let cli = parse(&[
            "--chain",
            "kusama",
            "--indexer-url",
            "http://localhost:8080",
            "--insecure",
        ]);
        let chain = cli.resolve_chain().unwrap();
        assert_eq!(chain.indexer_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn custom_chain_needs_genesis() {
        assert!(parse(&["--chain", "rococo"]).resolve_chain().is_err());
        let genesis = format!("0x{}", "ab".repeat(32));
        let chain = parse(&["--chain", "rococo", "--genesis-hash", &genesis])
            .resolve_chain()
            .unwrap();
        assert_eq!(chain.genesis_hash, genesis);
        assert_eq!(chain.indexer_url, None);
    }
}
