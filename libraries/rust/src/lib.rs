//! Batched quote fetching with 52-week new-high detection.

pub mod aggregate;
pub mod errors;
pub mod logger;
/// OAuth1.0a handshake and request signing
pub mod oauth;
pub mod partition;
pub mod pipeline;
/// Market-data provider client
pub mod provider;
pub mod pulltime;
pub mod quote;
/// Persistence service client
pub mod storage;
pub mod symbol;
pub mod universe;

pub use aggregate::QuoteSet;
pub use errors::Error;
pub use oauth::{AccessToken, Authorizer, TokenPair};
pub use partition::{partition, Batch};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutcome};
pub use quote::{derive, Quote, RawQuote};
pub use storage::Store;
pub use symbol::Symbol;
