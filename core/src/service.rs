use std::sync::Arc;

use tracing::{debug, info};

use crate::account::AccountHierarchy;
use crate::chain::Chain;
use crate::cursor::FetchCursor;
use crate::error::{HistoryError, Result};
use crate::filter::CategoryFilter;
use crate::merger::HistoryMerger;
use crate::record::TransactionRecord;
use crate::remote::TransferSource;
use crate::store::HistoryStore;
use crate::trigger::{TriggerAction, VisibilityTrigger};

/// Result of one sentinel-visible event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// A page was requested; `added` remote records arrived.
    Fetched { added: usize },
    /// A request is already running.
    Busy,
    /// Remote history is exhausted or unavailable.
    Exhausted,
    /// The active filter only shows locally recorded history.
    LocalOnly,
}

/// One history view session: a store, a remote source, and the merger and
/// trigger that sit between them and the presentation layer.
pub struct HistoryService<S, H> {
    source: Arc<S>,
    store: H,
    hierarchy: AccountHierarchy,
    merger: HistoryMerger,
    trigger: VisibilityTrigger,
    default_chain: Chain,
}

impl<S, H> HistoryService<S, H>
where
    S: TransferSource + 'static,
    H: HistoryStore,
{
    pub fn new(source: Arc<S>, store: H, hierarchy: AccountHierarchy) -> Self {
        Self {
            source,
            store,
            hierarchy,
            merger: HistoryMerger::new(),
            trigger: VisibilityTrigger::new(),
            default_chain: Chain::polkadot(),
        }
    }

    /// Chain used when no history has been opened yet.
    pub fn with_default_chain(mut self, chain: Chain) -> Self {
        self.default_chain = chain;
        self
    }

    pub fn hierarchy(&self) -> &AccountHierarchy {
        &self.hierarchy
    }

    pub fn merger(&self) -> &HistoryMerger {
        &self.merger
    }

    pub fn cursor(&self) -> &FetchCursor {
        self.merger.cursor()
    }

    pub fn address(&self) -> Option<&str> {
        self.merger.scope().map(|s| s.address.as_str())
    }

    pub fn chain(&self) -> Option<&Chain> {
        self.merger.scope().map(|s| &s.chain)
    }

    /// The open chain, or the default one before any address is opened.
    pub fn current_chain(&self) -> &Chain {
        self.chain().unwrap_or(&self.default_chain)
    }

    /// Make `chain` the default for the next `open`.
    pub fn set_default_chain(&mut self, chain: Chain) {
        self.default_chain = chain;
    }

    pub fn filter(&self) -> CategoryFilter {
        self.merger.filter()
    }

    pub fn trigger_connected(&self) -> bool {
        self.trigger.is_connected()
    }

    /// Show history for `address` on `chain`, reading local history and
    /// re-arming the trigger.
    pub fn open(&mut self, address: &str, chain: &Chain) -> Result<()> {
        let address = address.trim();
        if address.is_empty() {
            return Err(HistoryError::InvalidInput("Address cannot be empty.".into()));
        }
        self.merger
            .load_local(&self.store, address, chain, &self.hierarchy);
        self.trigger.reconnect();
        if self.merger.filter() == CategoryFilter::Staking {
            self.trigger.disconnect();
        }
        info!(
            address,
            chain = %chain.name,
            local = self.merger.local_records().len(),
            "history opened"
        );
        Ok(())
    }

    /// Re-read local history for the current scope, keeping remote pages.
    pub fn reload_local(&mut self) -> Result<()> {
        let scope = self
            .merger
            .scope()
            .cloned()
            .ok_or_else(|| HistoryError::InvalidInput("No address selected.".into()))?;
        self.merger
            .load_local(&self.store, &scope.address, &scope.chain, &self.hierarchy);
        Ok(())
    }

    /// Switch the category tab. The staking tab only shows local history,
    /// so it detaches the trigger; other tabs re-arm it while remote pages
    /// remain.
    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.merger.set_filter(filter);
        if filter == CategoryFilter::Staking {
            self.trigger.disconnect();
        } else if self.merger.cursor().has_more() {
            self.trigger.reconnect();
        }
    }

    /// The list's sentinel scrolled into view.
    ///
    /// Staking history is recorded locally only, so nothing is fetched
    /// while the staking filter is active.
    pub async fn on_sentinel_visible(&mut self) -> LoadMore {
        if self.merger.filter() == CategoryFilter::Staking {
            return LoadMore::LocalOnly;
        }
        match self.trigger.on_visible(self.merger.cursor()) {
            TriggerAction::Disconnect => LoadMore::Exhausted,
            TriggerAction::Wait => LoadMore::Busy,
            TriggerAction::Fetch => {
                let before = self.merger.cursor().accumulated().len();
                let Some(task) = self.merger.spawn_fetch(self.source.clone()) else {
                    return LoadMore::Busy;
                };
                debug!(page = task.page(), "sentinel fetch started");
                let result = task.join().await;
                self.merger.apply_page(result);
                let added = self.merger.cursor().accumulated().len() - before;
                debug!(added, has_more = self.merger.cursor().has_more(), "sentinel fetch done");
                LoadMore::Fetched { added }
            }
        }
    }

    pub fn visible(&self) -> Vec<TransactionRecord> {
        self.merger.visible()
    }

    pub fn merged(&self) -> Vec<TransactionRecord> {
        self.merger.merged()
    }

    pub fn find(&self, hash: &str) -> Option<TransactionRecord> {
        self.merger.find(hash)
    }

    /// Record transactions in local history for the current scope and
    /// reload it. Returns whether anything new was stored.
    pub fn append_local(&mut self, records: &[TransactionRecord]) -> Result<bool> {
        let scope = self
            .merger
            .scope()
            .cloned()
            .ok_or_else(|| HistoryError::InvalidInput("No address selected.".into()))?;
        let wrote = self.store.append_local_history(
            &scope.chain,
            &self.hierarchy,
            &scope.address,
            records,
        )?;
        if wrote {
            self.reload_local()?;
        }
        Ok(wrote)
    }
}
