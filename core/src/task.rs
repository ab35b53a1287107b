/// Background page fetches.
///
/// A [`FetchTask`] owns one request: it runs on the tokio runtime, yields
/// exactly one [`PageResult`] and is gone. The caller holds the handle and
/// either joins it or aborts it.
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::chain::Chain;
use crate::cursor::PageOutcome;
use crate::remote::TransferSource;

/// Parameters of one page request, stamped with the merger generation
/// that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    pub(crate) generation: u64,
    pub address: String,
    pub chain: Chain,
    pub page: u32,
    pub page_size: u32,
}

impl PageTicket {
    /// Run the request against `source` and wrap the outcome.
    pub async fn run<S: TransferSource>(self, source: &S) -> PageResult {
        let outcome = source
            .fetch_transfer_page(&self.chain, &self.address, self.page, self.page_size)
            .await
            .into();
        self.finish(outcome)
    }

    /// Pair an outcome with this ticket's generation.
    pub fn finish(self, outcome: PageOutcome) -> PageResult {
        PageResult {
            generation: self.generation,
            page: self.page,
            outcome,
        }
    }
}

/// The single message a fetch posts back.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub(crate) generation: u64,
    pub page: u32,
    pub outcome: PageOutcome,
}

pub struct FetchTask {
    generation: u64,
    page: u32,
    handle: JoinHandle<PageResult>,
}

impl FetchTask {
    /// Spawn `ticket` onto the current tokio runtime.
    pub fn spawn<S>(ticket: PageTicket, source: Arc<S>) -> Self
    where
        S: TransferSource + 'static,
    {
        let generation = ticket.generation;
        let page = ticket.page;
        let handle = tokio::spawn(async move { ticket.run(source.as_ref()).await });
        Self {
            generation,
            page,
            handle,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Stop the request. A later [`join`](Self::join) reports it as
    /// unavailable.
    pub fn abort(&self) {
        debug!(page = self.page, "aborting page fetch");
        self.handle.abort();
    }

    /// Wait for the result. Cancellation and panics surface as an
    /// unavailable page.
    pub async fn join(self) -> PageResult {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => PageResult {
                generation: self.generation,
                page: self.page,
                outcome: PageOutcome::Unavailable(if e.is_cancelled() {
                    "fetch cancelled".to_string()
                } else {
                    format!("fetch task failed: {e}")
                }),
            },
        }
    }
}
