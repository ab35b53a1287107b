/// Pagination state for the remote transfer history.
///
/// Transitions consume the cursor and return the next value, so callers
/// never observe a half-updated state.
use crate::error::Result;
use crate::record::RawRemoteRecord;
use crate::remote::TransferPage;

/// Records requested per indexer page.
pub const PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCursor {
    page_number: u32,
    is_fetching: bool,
    has_more: bool,
    accumulated: Vec<RawRemoteRecord>,
}

impl Default for FetchCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one page request as seen by the cursor.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Loaded(TransferPage),
    /// The request failed or the indexer returned no data.
    Unavailable(String),
}

impl From<Result<TransferPage>> for PageOutcome {
    fn from(result: Result<TransferPage>) -> Self {
        match result {
            Ok(page) => Self::Loaded(page),
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }
}

impl PageOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

impl FetchCursor {
    pub fn new() -> Self {
        Self {
            page_number: 0,
            is_fetching: false,
            has_more: true,
            accumulated: Vec::new(),
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn accumulated(&self) -> &[RawRemoteRecord] {
        &self.accumulated
    }

    /// A fetch may start only when none is in flight and the remote total
    /// has not been exhausted.
    pub fn can_fetch(&self) -> bool {
        !self.is_fetching && self.has_more
    }

    /// Mark a fetch as started. Returns the page to request, or `None`
    /// (with the cursor unchanged) when a fetch is not allowed.
    pub fn begin(self) -> (Self, Option<u32>) {
        if !self.can_fetch() {
            return (self, None);
        }
        let page = self.page_number;
        (
            Self {
                is_fetching: true,
                ..self
            },
            Some(page),
        )
    }

    /// Fold a finished request into the cursor.
    ///
    /// An unavailable page counts as empty and ends pagination.
    pub fn complete(self, outcome: PageOutcome) -> Self {
        match outcome {
            PageOutcome::Loaded(page) => {
                let mut accumulated = self.accumulated;
                accumulated.extend(page.transfers);
                let page_number = self.page_number.saturating_add(1);
                let has_more = u64::from(page_number) * u64::from(PAGE_SIZE) < page.count;
                Self {
                    page_number,
                    is_fetching: false,
                    has_more,
                    accumulated,
                }
            }
            PageOutcome::Unavailable(_) => Self {
                is_fetching: false,
                has_more: false,
                ..self
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(hash: &str) -> RawRemoteRecord {
        RawRemoteRecord {
            from: "A".into(),
            to: "B".into(),
            amount: "1".into(),
            block_num: 1,
            block_timestamp: 1,
            fee: "0".into(),
            hash: hash.into(),
            success: true,
        }
    }

    fn page(count: u64, n: usize) -> PageOutcome {
        PageOutcome::Loaded(TransferPage {
            count,
            transfers: (0..n).map(|i| transfer(&format!("0x{i}"))).collect(),
        })
    }

    #[test]
    fn fresh_cursor() {
        let c = FetchCursor::new();
        assert_eq!(c.page_number(), 0);
        assert!(!c.is_fetching());
        assert!(c.has_more());
        assert!(c.accumulated().is_empty());
        assert_eq!(c, FetchCursor::default());
    }

    #[test]
    fn begin_blocks_second_request() {
        let (c, page) = FetchCursor::new().begin();
        assert_eq!(page, Some(0));
        assert!(c.is_fetching());

        let (c, page) = c.begin();
        assert_eq!(page, None);
        assert!(c.is_fetching());
    }

    #[test]
    fn complete_advances_and_computes_has_more() {
        let (c, _) = FetchCursor::new().begin();
        let c = c.complete(page(60, 25));
        assert_eq!(c.page_number(), 1);
        assert!(!c.is_fetching());
        assert!(c.has_more());
        assert_eq!(c.accumulated().len(), 25);

        let (c, page_no) = c.begin();
        assert_eq!(page_no, Some(1));
        let c = c.complete(page(60, 25));
        assert!(c.has_more());

        let (c, _) = c.begin();
        let c = c.complete(page(60, 10));
        assert_eq!(c.page_number(), 3);
        assert!(!c.has_more());
        assert_eq!(c.accumulated().len(), 60);

        let (c, page_no) = c.begin();
        assert_eq!(page_no, None);
        assert!(!c.is_fetching());
    }

    #[test]
    fn exact_multiple_of_page_size_terminates() {
        let (c, _) = FetchCursor::new().begin();
        let c = c.complete(page(25, 25));
        assert!(!c.has_more());
    }

    #[test]
    fn unavailable_page_ends_pagination() {
        let (c, _) = FetchCursor::new().begin();
        let c = c.complete(page(100, 25));
        let (c, _) = c.begin();
        let c = c.complete(PageOutcome::Unavailable("timeout".into()));
        assert!(!c.is_fetching());
        assert!(!c.has_more());
        assert_eq!(c.page_number(), 1);
        assert_eq!(c.accumulated().len(), 25);
    }
}
