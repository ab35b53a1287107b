use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{TransferPage, TransferSource};
use crate::chain::{validate_indexer_url, Chain};
use crate::error::{HistoryError, Result};
use crate::record::RawRemoteRecord;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const TRANSFERS_PATH: &str = "/api/v2/scan/transfers";

/// HTTP client for Subscan-compatible indexers.
pub struct SubscanClient {
    http: reqwest::Client,
    api_key: Option<String>,
    allow_insecure: bool,
}

#[derive(Serialize)]
struct TransfersRequest<'a> {
    address: &'a str,
    row: u32,
    page: u32,
}

#[derive(Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<TransfersData>,
}

#[derive(Deserialize)]
struct TransfersData {
    #[serde(default)]
    count: u64,
    /// Subscan sends `null` instead of `[]` past the last page.
    #[serde(default)]
    transfers: Option<Vec<serde_json::Value>>,
}

impl SubscanClient {
    pub fn new(api_key: Option<String>, timeout: Duration, allow_insecure: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HistoryError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            allow_insecure,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| HistoryError::InvalidInput(format!("Invalid API key: {e}")))?;
            headers.insert("X-API-Key", value);
        }
        Ok(headers)
    }

    fn endpoint(&self, chain: &Chain) -> Result<String> {
        let base = chain.indexer_url.as_deref().ok_or_else(|| {
            HistoryError::InvalidChain(format!(
                "No indexer configured for chain '{}'. Pass --indexer-url.",
                chain.name
            ))
        })?;
        validate_indexer_url(base, self.allow_insecure)?;
        Ok(format!("{}{TRANSFERS_PATH}", base.trim_end_matches('/')))
    }
}

impl TransferSource for SubscanClient {
    async fn fetch_transfer_page(
        &self,
        chain: &Chain,
        address: &str,
        page: u32,
        page_size: u32,
    ) -> Result<TransferPage> {
        let url = self.endpoint(chain)?;
        debug!(chain = %chain.name, address, page, "requesting transfer page");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&TransfersRequest {
                address,
                row: page_size,
                page,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(%status, url = %url, "indexer request failed");
            return Err(HistoryError::Network(format!(
                "Indexer responded with HTTP {status}"
            )));
        }

        parse_transfers_response(&body)
    }
}

/// Decode an indexer transfers response. Entries that do not fit the
/// transfer shape are dropped so one bad row does not hide the page.
pub(crate) fn parse_transfers_response(body: &str) -> Result<TransferPage> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| HistoryError::Network(format!("Invalid indexer response: {e}")))?;

    if envelope.code != 0 {
        return Err(HistoryError::Indexer {
            code: envelope.code,
            message: envelope.message,
        });
    }

    let data = envelope.data.ok_or(HistoryError::NoData)?;
    let raw = data.transfers.unwrap_or_default();
    let total = raw.len();

    let transfers: Vec<RawRemoteRecord> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "dropping malformed transfer");
                None
            }
        })
        .collect();

    if transfers.len() < total {
        warn!(
            dropped = total - transfers.len(),
            "indexer page contained malformed transfers"
        );
    }

    Ok(TransferPage {
        count: data.count,
        transfers,
    })
}
