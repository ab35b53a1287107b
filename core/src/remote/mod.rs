/// Remote transfer history, fetched page by page from a chain indexer.
mod subscan;

pub use subscan::{SubscanClient, DEFAULT_TIMEOUT};

use std::future::Future;

use crate::chain::Chain;
use crate::error::Result;
use crate::record::RawRemoteRecord;

/// One page of indexer results. `count` is the indexer's total for the
/// address, not the length of `transfers`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferPage {
    pub count: u64,
    pub transfers: Vec<RawRemoteRecord>,
}

/// Source of paginated transfer history for an address.
pub trait TransferSource: Send + Sync {
    fn fetch_transfer_page(
        &self,
        chain: &Chain,
        address: &str,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<TransferPage>> + Send;
}

