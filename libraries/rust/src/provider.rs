use crate::errors::Error;
use crate::oauth::{AccessToken, Authorizer};
use crate::partition::Batch;
use crate::quote::RawQuote;
use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client as HTTPClient, Method};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const QUOTE_PATH: &str = "v1/market/quote/";

// lifts the provider's 25 symbol cap to 50 per lookup
const OVERRIDE_SYMBOL_COUNT: &str = "overrideSymbolCount";

#[derive(Deserialize, Debug)]
struct QuoteEnvelope {
    #[serde(rename = "QuoteResponse")]
    quote_response: QuoteResponse,
}

#[derive(Deserialize, Debug, Default)]
struct QuoteResponse {
    #[serde(rename = "QuoteData", default)]
    quote_data: Vec<Value>,
}

#[derive(Deserialize, Debug, Default)]
struct QuoteData {
    #[serde(rename = "All", default)]
    all: AllQuoteDetails,
    #[serde(rename = "Product", default)]
    product: Product,
}

#[derive(Deserialize, Debug, Default)]
struct Product {
    symbol: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct AllQuoteDetails {
    company_name: Option<String>,
    ask: Option<f64>,
    ask_size: Option<u64>,
    bid: Option<f64>,
    bid_size: Option<u64>,
    high52: Option<f64>,
    low52: Option<f64>,
    average_volume: Option<u64>,
    last_trade: Option<f64>,
    sector_name: Option<String>,
}

impl From<QuoteData> for RawQuote {
    fn from(data: QuoteData) -> Self {
        RawQuote {
            symbol: data.product.symbol,
            company_name: data.all.company_name,
            ask: data.all.ask,
            ask_size: data.all.ask_size,
            bid: data.all.bid,
            bid_size: data.all.bid_size,
            high52: data.all.high52,
            low52: data.all.low52,
            average_volume: data.all.average_volume,
            price: data.all.last_trade,
            industry: data.all.sector_name,
        }
    }
}

/// Parse a multi-symbol quote response body into raw quotes, in provider order.
///
/// Entries that do not match the expected shape are skipped on their own;
/// only a malformed envelope fails the whole body.
pub fn parse_quote_response(body: &str) -> Result<Vec<RawQuote>, Error> {
    let envelope: QuoteEnvelope = serde_json::from_str(body)?;

    Ok(envelope
        .quote_response
        .quote_data
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            match serde_json::from_value::<QuoteData>(entry) {
                Ok(data) => Some(RawQuote::from(data)),
                Err(e) => {
                    debug!(position, "skipping malformed quote entry: {}", e);
                    None
                }
            }
        })
        .collect())
}

#[automock]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch every symbol of `batch` in a single provider request.
    async fn fetch_batch(
        &self,
        batch: &Batch,
        access_token: &AccessToken,
    ) -> Result<Vec<RawQuote>, Error>;
}

pub struct Client {
    base_url: Url,
    authorizer: Arc<dyn Authorizer>,
    http_client: HTTPClient,
}

impl Client {
    pub fn new(base_url: Url, authorizer: Arc<dyn Authorizer>, http_client: HTTPClient) -> Self {
        Client {
            base_url,
            authorizer,
            http_client,
        }
    }

    fn quote_url(&self, batch: &Batch) -> Result<Url, Error> {
        let mut url = self.base_url.join(QUOTE_PATH)?;
        url.path_segments_mut()
            .map_err(|_| Error::Other(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(&format!("{}.json", batch.joined()));
        url.query_pairs_mut()
            .append_pair("detailFlag", "ALL")
            .append_pair(OVERRIDE_SYMBOL_COUNT, "true");
        Ok(url)
    }
}

#[async_trait]
impl QuoteProvider for Client {
    async fn fetch_batch(
        &self,
        batch: &Batch,
        access_token: &AccessToken,
    ) -> Result<Vec<RawQuote>, Error> {
        let url = self.quote_url(batch)?;

        let header = self
            .authorizer
            .sign(&Method::GET, &url, access_token.pair())?;

        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, header)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Provider { status, body });
        }

        parse_quote_response(&body)
    }
}

/// Fetch one batch with failures confined to that batch.
///
/// A missing access token, a provider error or an elapsed deadline all
/// yield an empty result. One attempt, no retries.
pub async fn fetch_isolated(
    provider: &dyn QuoteProvider,
    batch: &Batch,
    access_token: Option<&AccessToken>,
    timeout: Duration,
) -> Vec<RawQuote> {
    let Some(access_token) = access_token else {
        warn!(
            batch = batch.index,
            size = batch.len(),
            "skipping batch: {}",
            Error::NotAuthorized
        );
        return Vec::new();
    };

    let result = match tokio::time::timeout(timeout, provider.fetch_batch(batch, access_token)).await
    {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(timeout.as_millis())),
    };

    match result {
        Ok(raw_quotes) => {
            debug!(
                batch = batch.index,
                size = batch.len(),
                received = raw_quotes.len(),
                "batch fetched"
            );
            raw_quotes
        }
        Err(e) => {
            warn!(
                batch = batch.index,
                size = batch.len(),
                "batch fetch failed: {}",
                e
            );
            Vec::new()
        }
    }
}
