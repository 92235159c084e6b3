use crate::errors::Error;
use crate::quote::Quote;
use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client as HTTPClient, Response, StatusCode};
use serde_json::{json, Value};
use tracing::info;
use url::Url;

const QUOTES_PATH: &str = "quotes";

const PULLS_PATH: &str = "pulls";

/// Persistence collaborator. Records are opaque JSON objects owned by the
/// storage service.
#[automock]
#[async_trait]
pub trait Store: Send + Sync {
    /// Append quotes. Empty input is rejected.
    async fn insert_quotes(&self, quotes: Vec<Quote>) -> Result<(), Error>;

    /// All stored records, most recent first.
    async fn query_quotes(&self) -> Result<Vec<Value>, Error>;

    /// Append one pull timestamp.
    async fn record_pull_time(&self, pulled_at: String) -> Result<(), Error>;
}

pub struct Client {
    base_url: Url,
    http_client: HTTPClient,
}

impl Client {
    pub fn new(base_url: Url, http_client: HTTPClient) -> Self {
        Client {
            base_url,
            http_client,
        }
    }

    async fn check(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(store_error(status, response.text().await))
    }
}

fn store_error(status: StatusCode, body: Result<String, reqwest::Error>) -> Error {
    let body = body.unwrap_or_else(|e| format!("<unreadable body: {e}>"));
    Error::Store(format!("store responded with status {}: {}", status, body))
}

#[async_trait]
impl Store for Client {
    async fn insert_quotes(&self, quotes: Vec<Quote>) -> Result<(), Error> {
        if quotes.is_empty() {
            return Err(Error::EmptyInsert);
        }

        let url = self.base_url.join(QUOTES_PATH)?;

        let response = self.http_client.post(url).json(&quotes).send().await?;
        Self::check(response).await?;

        info!("stored {} quotes", quotes.len());

        Ok(())
    }

    async fn query_quotes(&self) -> Result<Vec<Value>, Error> {
        let url = self.base_url.join(QUOTES_PATH)?;

        let response = self.http_client.get(url).send().await?;
        let records: Vec<Value> = Self::check(response).await?.json().await?;

        Ok(records)
    }

    async fn record_pull_time(&self, pulled_at: String) -> Result<(), Error> {
        let url = self.base_url.join(PULLS_PATH)?;

        let response = self
            .http_client
            .post(url)
            .json(&json!({ "pulledAt": pulled_at }))
            .send()
            .await?;
        Self::check(response).await?;

        Ok(())
    }
}
