use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::account::AccountHierarchy;
use crate::chain::Chain;
use crate::cursor::{FetchCursor, PageOutcome, PAGE_SIZE};
use crate::filter::CategoryFilter;
use crate::record::{remap, TransactionRecord};
use crate::remote::TransferSource;
use crate::store::HistoryStore;
use crate::task::{FetchTask, PageResult, PageTicket};

/// The (address, chain) pair a history view is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryScope {
    pub address: String,
    pub chain: Chain,
}

/// Merges locally recorded history with remote pages into one
/// de-duplicated, newest-first list.
#[derive(Debug, Default)]
pub struct HistoryMerger {
    scope: Option<HistoryScope>,
    local: Vec<TransactionRecord>,
    cursor: FetchCursor,
    filter: CategoryFilter,
    /// Bumped on every scope change; results from older generations are
    /// dropped.
    generation: u64,
}

impl HistoryMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(&self) -> Option<&HistoryScope> {
        self.scope.as_ref()
    }

    pub fn cursor(&self) -> &FetchCursor {
        &self.cursor
    }

    pub fn local_records(&self) -> &[TransactionRecord] {
        &self.local
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    /// Point the merger at a new (address, chain). Returns `true` and
    /// resets local records and the cursor if the scope changed.
    pub fn set_scope(&mut self, address: &str, chain: &Chain) -> bool {
        let unchanged = self
            .scope
            .as_ref()
            .is_some_and(|s| s.address == address && s.chain == *chain);
        if unchanged {
            return false;
        }
        self.scope = Some(HistoryScope {
            address: address.to_string(),
            chain: chain.clone(),
        });
        self.local.clear();
        self.cursor = FetchCursor::new();
        self.generation += 1;
        debug!(address, chain = %chain.name, generation = self.generation, "history scope changed");
        true
    }

    /// Read local history for `address` on `chain`. A store failure leaves
    /// the local list empty rather than blocking the view.
    pub fn load_local<H: HistoryStore + ?Sized>(
        &mut self,
        store: &H,
        address: &str,
        chain: &Chain,
        hierarchy: &AccountHierarchy,
    ) {
        self.set_scope(address, chain);
        self.local = match store.load_local_history(chain, hierarchy, address) {
            Ok(records) => records,
            Err(e) => {
                warn!(address, chain = %chain.name, error = %e, "failed to read local history");
                Vec::new()
            }
        };
    }

    /// Start a page request if one is allowed. The returned ticket must be
    /// answered through [`apply_page`](Self::apply_page).
    pub fn begin_fetch(&mut self) -> Option<PageTicket> {
        let scope = self.scope.as_ref()?;
        let (cursor, page) = std::mem::take(&mut self.cursor).begin();
        self.cursor = cursor;
        let page = page?;
        debug!(address = %scope.address, page, "fetching remote history page");
        Some(PageTicket {
            generation: self.generation,
            address: scope.address.clone(),
            chain: scope.chain.clone(),
            page,
            page_size: PAGE_SIZE,
        })
    }

    /// Fold a page result into the cursor. Returns `false` if the result
    /// belongs to an earlier scope and was ignored.
    pub fn apply_page(&mut self, result: PageResult) -> bool {
        if result.generation != self.generation {
            debug!(page = result.page, "ignoring page result from a previous scope");
            return false;
        }
        match &result.outcome {
            PageOutcome::Loaded(page) => debug!(
                page = result.page,
                received = page.transfers.len(),
                total = page.count,
                "remote history page loaded"
            ),
            PageOutcome::Unavailable(reason) => warn!(
                page = result.page,
                reason = %reason,
                "remote history unavailable, showing local history only"
            ),
        }
        self.cursor = std::mem::take(&mut self.cursor).complete(result.outcome);
        true
    }

    /// Fetch the next page inline. No-op while a request is in flight or
    /// once remote history is exhausted.
    pub async fn fetch_next_page<S: TransferSource>(&mut self, source: &S) {
        if let Some(ticket) = self.begin_fetch() {
            let result = ticket.run(source).await;
            self.apply_page(result);
        }
    }

    /// Fetch the next page on a background task owned by the caller.
    pub fn spawn_fetch<S>(&mut self, source: Arc<S>) -> Option<FetchTask>
    where
        S: TransferSource + 'static,
    {
        self.begin_fetch()
            .map(|ticket| FetchTask::spawn(ticket, source))
    }

    /// Local records followed by remote records not already known locally,
    /// sorted newest first.
    pub fn merged(&self) -> Vec<TransactionRecord> {
        let address = self
            .scope
            .as_ref()
            .map(|s| s.address.as_str())
            .unwrap_or_default();

        // Local wins: it may carry detail the indexer cannot reconstruct.
        // Offset paging can repeat a transfer on the next page; first copy wins.
        let mut seen: HashSet<&str> = self.local.iter().map(|r| r.hash.as_str()).collect();
        let mut all = self.local.clone();
        all.extend(
            self.cursor
                .accumulated()
                .iter()
                .filter(|raw| seen.insert(raw.hash.as_str()))
                .map(|raw| remap(raw, address)),
        );
        all.sort_by(|a, b| b.date.cmp(&a.date));
        all
    }

    /// [`merged`](Self::merged) projected through the active filter.
    pub fn visible(&self) -> Vec<TransactionRecord> {
        self.filter.apply(self.merged())
    }

    /// Look up a record in the merged view by hash.
    pub fn find(&self, hash: &str) -> Option<TransactionRecord> {
        self.merged().into_iter().find(|r| r.hash == hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HistoryError, Result};
    use crate::record::RawRemoteRecord;
    use crate::remote::TransferPage;
    use std::sync::Mutex;

    struct MemoryStore(Vec<TransactionRecord>);

    impl HistoryStore for MemoryStore {
        fn load_local_history(
            &self,
            _chain: &Chain,
            _hierarchy: &AccountHierarchy,
            _address: &str,
        ) -> Result<Vec<TransactionRecord>> {
            Ok(self.0.clone())
        }

        fn append_local_history(
            &self,
            _chain: &Chain,
            _hierarchy: &AccountHierarchy,
            _address: &str,
            _records: &[TransactionRecord],
        ) -> Result<bool> {
            Ok(false)
        }
    }

    struct BrokenStore;

    impl HistoryStore for BrokenStore {
        fn load_local_history(
            &self,
            _chain: &Chain,
            _hierarchy: &AccountHierarchy,
            _address: &str,
        ) -> Result<Vec<TransactionRecord>> {
            Err(HistoryError::Storage("disk on fire".into()))
        }

        fn append_local_history(
            &self,
            _chain: &Chain,
            _hierarchy: &AccountHierarchy,
            _address: &str,
            _records: &[TransactionRecord],
        ) -> Result<bool> {
            Err(HistoryError::Storage("disk on fire".into()))
        }
    }

    /// Serves fixed pages and records which pages were requested.
    struct ScriptedSource {
        count: u64,
        pages: Vec<Vec<RawRemoteRecord>>,
        requested: Mutex<Vec<u32>>,
    }

    impl TransferSource for ScriptedSource {
        async fn fetch_transfer_page(
            &self,
            _chain: &Chain,
            _address: &str,
            page: u32,
            _page_size: u32,
        ) -> Result<TransferPage> {
            self.requested.lock().unwrap().push(page);
            let transfers = self.pages.get(page as usize).cloned().unwrap_or_default();
            Ok(TransferPage {
                count: self.count,
                transfers,
            })
        }
    }

    struct FailingSource;

    impl TransferSource for FailingSource {
        async fn fetch_transfer_page(
            &self,
            _chain: &Chain,
            _address: &str,
            _page: u32,
            _page_size: u32,
        ) -> Result<TransferPage> {
            Err(HistoryError::NoData)
        }
    }

    fn local(hash: &str, date: i64, action: &str) -> TransactionRecord {
        TransactionRecord {
            action: action.into(),
            amount: "5".into(),
            block: None,
            date,
            fee: "0.01".into(),
            from: "X".into(),
            to: "Y".into(),
            hash: hash.into(),
            status: "success".into(),
            sub_action: None,
            friends: Some(vec!["F1".into()]),
            token: None,
        }
    }

    fn raw(hash: &str, ts: i64, from: &str, to: &str) -> RawRemoteRecord {
        RawRemoteRecord {
            from: from.into(),
            to: to.into(),
            amount: "1".into(),
            block_num: 7,
            block_timestamp: ts,
            fee: "0".into(),
            hash: hash.into(),
            success: true,
        }
    }

    fn loaded(store_records: Vec<TransactionRecord>) -> HistoryMerger {
        let mut m = HistoryMerger::new();
        m.load_local(
            &MemoryStore(store_records),
            "X",
            &Chain::polkadot(),
            &AccountHierarchy::default(),
        );
        m
    }

    #[tokio::test]
    async fn example_scenario() {
        let mut m = loaded(vec![local("A", 500, "send")]);
        let source = ScriptedSource {
            count: 2,
            pages: vec![vec![raw("A", 9, "Q", "X"), raw("B", 1, "X", "X")]],
            requested: Mutex::new(Vec::new()),
        };

        m.fetch_next_page(&source).await;
        let merged = m.merged();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].hash, "B");
        assert_eq!(merged[0].date, 1000);
        assert_eq!(merged[0].action, "send");
        assert_eq!(merged[0].status, "success");
        assert_eq!(merged[1].hash, "A");
        assert_eq!(merged[1].date, 500);
        assert!(!m.cursor().has_more());
    }

    #[tokio::test]
    async fn local_wins_on_hash_collision() {
        let mut m = loaded(vec![local("H", 10_000_000, "pool_join")]);
        let source = ScriptedSource {
            count: 1,
            pages: vec![vec![raw("H", 1, "Z", "X")]],
            requested: Mutex::new(Vec::new()),
        };
        m.fetch_next_page(&source).await;

        let merged = m.merged();
        let hits: Vec<_> = merged.iter().filter(|r| r.hash == "H").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].action, "pool_join");
        assert_eq!(hits[0].amount, "5");
        assert!(hits[0].friends.is_some());
    }

    #[tokio::test]
    async fn transfer_repeated_across_pages_appears_once() {
        // A new transfer between requests shifts the last row of page 0
        // onto page 1.
        let mut m = loaded(Vec::new());
        let source = ScriptedSource {
            count: 30,
            pages: vec![
                vec![raw("N", 20, "Y", "X"), raw("D", 10, "X", "Y")],
                vec![raw("D", 10, "X", "Y"), raw("E", 5, "Y", "X")],
            ],
            requested: Mutex::new(Vec::new()),
        };
        m.fetch_next_page(&source).await;
        m.fetch_next_page(&source).await;
        assert_eq!(*source.requested.lock().unwrap(), vec![0, 1]);

        let hashes: Vec<_> = m.merged().into_iter().map(|r| r.hash).collect();
        assert_eq!(hashes, vec!["N", "D", "E"]);
        assert_eq!(m.find("D").unwrap().action, "send");
    }

    #[tokio::test]
    async fn merged_is_sorted_newest_first() {
        let mut m = loaded(vec![local("L1", 3_000, "send"), local("L2", 9_000, "bond")]);
        let source = ScriptedSource {
            count: 3,
            pages: vec![vec![raw("R1", 5, "X", "Y"), raw("R2", 1, "Y", "X"), raw("R3", 8, "Y", "X")]],
            requested: Mutex::new(Vec::new()),
        };
        m.fetch_next_page(&source).await;

        let merged = m.merged();
        assert_eq!(merged.len(), 5);
        assert!(merged.windows(2).all(|w| w[0].date >= w[1].date));
        assert_eq!(merged[0].hash, "L2");
    }

    #[tokio::test]
    async fn pagination_terminates_and_then_noops() {
        let pages: Vec<Vec<RawRemoteRecord>> = (0..3u32)
            .map(|p| {
                (0..25u32)
                    .map(|i| raw(&format!("p{p}-{i}"), i64::from(p * 100 + i), "X", "Y"))
                    .collect()
            })
            .collect();
        let source = ScriptedSource {
            count: 60,
            pages,
            requested: Mutex::new(Vec::new()),
        };
        let mut m = loaded(Vec::new());

        for _ in 0..10 {
            m.fetch_next_page(&source).await;
        }
        assert!(!m.cursor().has_more());
        assert_eq!(m.cursor().page_number(), 3);
        assert_eq!(*source.requested.lock().unwrap(), vec![0, 1, 2]);

        let len = m.cursor().accumulated().len();
        m.fetch_next_page(&source).await;
        assert_eq!(m.cursor().accumulated().len(), len);
    }

    #[tokio::test]
    async fn failed_fetch_shows_local_only() {
        let mut m = loaded(vec![local("A", 1, "send")]);
        m.fetch_next_page(&FailingSource).await;
        assert!(!m.cursor().has_more());
        assert!(!m.cursor().is_fetching());
        assert_eq!(m.merged().len(), 1);
    }

    #[test]
    fn broken_store_degrades_to_empty() {
        let mut m = HistoryMerger::new();
        m.load_local(&BrokenStore, "X", &Chain::polkadot(), &AccountHierarchy::default());
        assert!(m.local_records().is_empty());
        assert_eq!(m.scope().unwrap().address, "X");
    }

    #[test]
    fn load_local_is_idempotent() {
        let store = MemoryStore(vec![local("A", 1, "send"), local("B", 2, "bond")]);
        let h = AccountHierarchy::default();
        let mut m = HistoryMerger::new();
        m.load_local(&store, "X", &Chain::polkadot(), &h);
        let first = m.local_records().to_vec();
        m.load_local(&store, "X", &Chain::polkadot(), &h);
        assert_eq!(m.local_records(), first.as_slice());
    }

    #[test]
    fn no_fetch_without_scope_or_while_in_flight() {
        let mut m = HistoryMerger::new();
        assert!(m.begin_fetch().is_none());

        m.set_scope("X", &Chain::polkadot());
        let ticket = m.begin_fetch().unwrap();
        assert_eq!(ticket.page, 0);
        assert_eq!(ticket.page_size, PAGE_SIZE);
        assert!(m.cursor().is_fetching());
        assert!(m.begin_fetch().is_none());
    }

    #[test]
    fn scope_change_resets_and_drops_late_results() {
        let mut m = loaded(vec![local("A", 1, "send")]);
        let ticket = m.begin_fetch().unwrap();

        assert!(m.set_scope("Other", &Chain::polkadot()));
        assert!(m.local_records().is_empty());
        assert_eq!(*m.cursor(), FetchCursor::new());

        let late = ticket.finish(PageOutcome::Loaded(TransferPage {
            count: 1,
            transfers: vec![raw("R", 1, "X", "Y")],
        }));
        assert!(!m.apply_page(late));
        assert!(m.cursor().accumulated().is_empty());
        assert!(m.cursor().has_more());
    }

    #[test]
    fn same_scope_is_not_a_reset() {
        let mut m = HistoryMerger::new();
        assert!(m.set_scope("X", &Chain::kusama()));
        let _ = m.begin_fetch();
        assert!(!m.set_scope("X", &Chain::kusama()));
        assert!(m.cursor().is_fetching());
        assert!(m.set_scope("X", &Chain::polkadot()));
        assert!(!m.cursor().is_fetching());
    }

    #[tokio::test]
    async fn visible_applies_filter() {
        let mut m = loaded(vec![
            local("S1", 10_000, "bond"),
            local("S2", 20_000, "pool_claim"),
            local("O1", 30_000, "make_recoverable"),
        ]);
        let source = ScriptedSource {
            count: 1,
            pages: vec![vec![raw("T1", 5, "Y", "X")]],
            requested: Mutex::new(Vec::new()),
        };
        m.fetch_next_page(&source).await;

        assert_eq!(m.visible().len(), 4);
        m.set_filter(CategoryFilter::Transfers);
        let transfers = m.visible();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].action, "receive");
        m.set_filter(CategoryFilter::Staking);
        let staking: Vec<_> = m.visible().into_iter().map(|r| r.hash).collect();
        assert_eq!(staking, vec!["S2", "S1"]);
    }

    #[tokio::test]
    async fn spawned_fetch_applies_result() {
        let mut m = loaded(Vec::new());
        let source = Arc::new(ScriptedSource {
            count: 1,
            pages: vec![vec![raw("R", 2, "X", "Y")]],
            requested: Mutex::new(Vec::new()),
        });

        let task = m.spawn_fetch(source.clone()).unwrap();
        assert!(m.spawn_fetch(source.clone()).is_none());
        let result = task.join().await;
        assert!(m.apply_page(result));
        assert_eq!(m.merged().len(), 1);
        assert_eq!(m.find("R").unwrap().date, 2000);
    }
}
