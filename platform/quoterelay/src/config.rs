use anyhow::{anyhow, Context, Result};
use newhighs::oauth::ConsumerCredentials;
use newhighs::partition::DEFAULT_BATCH_SIZE;
use newhighs::pipeline::{PipelineConfig, DEFAULT_REQUEST_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DEFAULT_SERVER_PORT: u16 = 8080;

const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.etrade.com";

const DEFAULT_AUTHORIZE_URL: &str = "https://us.etrade.com/e/t/etws/authorize";

const DEFAULT_SYMBOLS_PATH: &str = "symbols.txt";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub consumer: ConsumerCredentials,
    pub provider_base_url: Url,
    pub authorize_url: Url,
    pub store_base_url: Url,
    pub symbols_path: PathBuf,
    pub pipeline: PipelineConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("Failed to get {}: not set", key))
        };

        let server_port = match lookup("SERVER_PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("SERVER_PORT is not a port number: {}", value))?,
            None => DEFAULT_SERVER_PORT,
        };

        let batch_size = match lookup("BATCH_SIZE") {
            Some(value) => value
                .parse::<usize>()
                .with_context(|| format!("BATCH_SIZE is not a number: {}", value))?,
            None => DEFAULT_BATCH_SIZE,
        };

        if batch_size == 0 {
            return Err(anyhow!("BATCH_SIZE must be greater than zero"));
        }

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECONDS") {
            Some(value) => Duration::from_secs(
                value
                    .parse::<u64>()
                    .with_context(|| format!("REQUEST_TIMEOUT_SECONDS is not a number: {}", value))?,
            ),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Config {
            server_port,
            consumer: ConsumerCredentials {
                key: required("OAUTH_CONSUMER_KEY")?,
                secret: required("OAUTH_CONSUMER_SECRET")?,
            },
            provider_base_url: base_url(
                "PROVIDER_BASE_URL",
                &lookup("PROVIDER_BASE_URL").unwrap_or(DEFAULT_PROVIDER_BASE_URL.to_string()),
            )?,
            authorize_url: Url::parse(
                &lookup("OAUTH_AUTHORIZE_URL").unwrap_or(DEFAULT_AUTHORIZE_URL.to_string()),
            )
            .context("OAUTH_AUTHORIZE_URL is not a valid URL")?,
            store_base_url: base_url("STORE_BASE_URL", &required("STORE_BASE_URL")?)?,
            symbols_path: PathBuf::from(
                lookup("SYMBOLS_PATH").unwrap_or(DEFAULT_SYMBOLS_PATH.to_string()),
            ),
            pipeline: PipelineConfig {
                batch_size,
                request_timeout,
            },
        })
    }
}

/// Parse a URL used as a join base, ensuring its path ends with `/`.
fn base_url(key: &str, value: &str) -> Result<Url> {
    let mut url = Url::parse(value).with_context(|| format!("{} is not a valid URL", key))?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("OAUTH_CONSUMER_KEY", "key"),
        ("OAUTH_CONSUMER_SECRET", "secret"),
        ("STORE_BASE_URL", "http://store.local:8000/api"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.consumer.key, "key");
        assert_eq!(config.provider_base_url.as_str(), "https://api.etrade.com/");
        assert_eq!(config.store_base_url.as_str(), "http://store.local:8000/api/");
        assert_eq!(config.symbols_path, PathBuf::from("symbols.txt"));
        assert_eq!(config.pipeline.batch_size, 50);
        assert_eq!(config.pipeline.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("SERVER_PORT", "9000"),
            ("BATCH_SIZE", "25"),
            ("REQUEST_TIMEOUT_SECONDS", "3"),
            ("SYMBOLS_PATH", "/data/universe.txt"),
            ("PROVIDER_BASE_URL", "https://apisb.etrade.com"),
        ]);

        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.server_port, 9000);
        assert_eq!(config.pipeline.batch_size, 25);
        assert_eq!(config.pipeline.request_timeout, Duration::from_secs(3));
        assert_eq!(config.symbols_path, PathBuf::from("/data/universe.txt"));
        assert_eq!(
            config.provider_base_url.as_str(),
            "https://apisb.etrade.com/"
        );
    }

    #[test]
    fn test_missing_required() {
        let result = Config::from_lookup(lookup(&REQUIRED[..2]));

        let message = result.unwrap_err().to_string();
        assert!(message.contains("STORE_BASE_URL"));
    }

    #[test]
    fn test_zero_batch_size() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("BATCH_SIZE", "0"));

        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_invalid_port() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_PORT", "eighty"));

        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }
}
