use reqwest::StatusCode;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("batch size must be greater than zero, got {0}")]
    InvalidBatchSize(usize),
    #[error("invalid symbol: {0:?}")]
    InvalidSymbol(String),
    #[error("no access token has been established")]
    NotAuthorized,
    #[error("request timed out after {0} ms")]
    Timeout(u128),
    #[error("provider responded with status {status}: {body}")]
    Provider { status: StatusCode, body: String },
    #[error("store error: {0}")]
    Store(String),
    #[error("refusing to insert an empty record set")]
    EmptyInsert,
    #[error("failed to load symbol universe: {0}")]
    Universe(String),
    #[error("signing error: {0}")]
    Signing(String),
    #[error("OAuth error: {0}")]
    OAuth(String),
    #[error("Other error: {0}")]
    Other(String),
}
