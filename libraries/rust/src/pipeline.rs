use crate::aggregate::QuoteSet;
use crate::errors::Error;
use crate::oauth::AccessToken;
use crate::partition::{partition, DEFAULT_BATCH_SIZE};
use crate::provider::{fetch_isolated, QuoteProvider};
use crate::pulltime::format_pull_time;
use crate::quote::{derive, Quote, RawQuote};
use crate::storage::Store;
use crate::universe::UniverseSource;
use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub batch_size: usize,
    /// Deadline applied to each batch request.
    pub request_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            batch_size: DEFAULT_BATCH_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Partitioned,
    Fetching,
    Aggregated,
    Persisted,
    PersistSkipped,
    Completed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Partitioned => "partitioned",
            Stage::Fetching => "fetching",
            Stage::Aggregated => "aggregated",
            Stage::Persisted => "persisted",
            Stage::PersistSkipped => "persist_skipped",
            Stage::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Historical records returned by the store.
    Records(Vec<Value>),
    /// Nothing new was found.
    Empty,
}

impl PipelineOutcome {
    pub fn into_json(self) -> Value {
        match self {
            PipelineOutcome::Records(records) => Value::Array(records),
            PipelineOutcome::Empty => Value::Null,
        }
    }
}

pub struct Pipeline {
    universe: Arc<dyn UniverseSource>,
    provider: Arc<dyn QuoteProvider>,
    store: Arc<dyn Store>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        universe: Arc<dyn UniverseSource>,
        provider: Arc<dyn QuoteProvider>,
        store: Arc<dyn Store>,
        config: PipelineConfig,
    ) -> Self {
        Pipeline {
            universe,
            provider,
            store,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run partition, fetch, derive, aggregate, persist and query once.
    ///
    /// Only a universe that cannot be loaded or an invalid batch size fail
    /// the run. Batch, insert, pull-time and query failures are logged.
    pub async fn run(&self, access_token: Option<AccessToken>) -> Result<PipelineOutcome, Error> {
        let symbols = self.universe.load().await?;

        let batches = partition(&symbols, self.config.batch_size)?;

        info!(
            stage = %Stage::Partitioned,
            symbols = symbols.len(),
            batches = batches.len(),
            "symbol universe partitioned"
        );

        if access_token.is_none() {
            warn!("no access token established, every batch will fail closed");
        }

        debug!(stage = %Stage::Fetching, "dispatching {} batches", batches.len());

        let fetched: Vec<Vec<RawQuote>> = join_all(batches.iter().map(|batch| {
            fetch_isolated(
                self.provider.as_ref(),
                batch,
                access_token.as_ref(),
                self.config.request_timeout,
            )
        }))
        .await;

        let raw_count: usize = fetched.iter().map(Vec::len).sum();

        // folded in partition order, so the lowest batch index wins a duplicate
        let quote_set = QuoteSet::from_batches(
            fetched
                .iter()
                .map(|raw_quotes| raw_quotes.iter().filter_map(derive)),
        );

        info!(
            stage = %Stage::Aggregated,
            raw_quotes = raw_count,
            quotes = quote_set.len(),
            duplicates = quote_set.duplicates(),
            incomplete = raw_count - quote_set.len() - quote_set.duplicates(),
            "batch results aggregated"
        );

        let quotes = quote_set.into_quotes();

        self.persist(&quotes).await;

        self.record_pull_time().await;

        if quotes.is_empty() {
            info!(stage = %Stage::Completed, "no quotes found");
            return Ok(PipelineOutcome::Empty);
        }

        let records = match self.store.query_quotes().await {
            Ok(records) => records,
            Err(e) => {
                warn!("failed to query stored quotes, returning this run's quotes: {}", e);
                quotes
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<Vec<Value>, serde_json::Error>>()?
            }
        };

        info!(stage = %Stage::Completed, records = records.len(), "run completed");

        Ok(PipelineOutcome::Records(records))
    }

    async fn persist(&self, quotes: &[Quote]) {
        if quotes.is_empty() {
            info!(stage = %Stage::PersistSkipped, "nothing to store");
            return;
        }

        match self.store.insert_quotes(quotes.to_vec()).await {
            Ok(()) => info!(stage = %Stage::Persisted, quotes = quotes.len(), "quotes stored"),
            Err(e) => warn!(stage = %Stage::Persisted, "failed to store quotes: {}", e),
        }
    }

    async fn record_pull_time(&self) {
        let pulled_at = format_pull_time(Utc::now());

        match self.store.record_pull_time(pulled_at.clone()).await {
            Ok(()) => debug!("pull time {} recorded", pulled_at),
            Err(e) => warn!("failed to record pull time {}: {}", pulled_at, e),
        }
    }
}
