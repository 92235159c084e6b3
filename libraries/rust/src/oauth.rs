//! OAuth1.0a handshake and request signing (HMAC-SHA1).

use crate::errors::Error;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use mockall::automock;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client as HTTPClient, Method};
use sha1::Sha1;
use std::fmt;
use tracing::debug;
use url::Url;
use uuid::Uuid;

type HmacSha1 = Hmac<Sha1>;

const REQUEST_TOKEN_PATH: &str = "oauth/request_token";

const ACCESS_TOKEN_PATH: &str = "oauth/access_token";

// RFC 3986 unreserved characters stay as-is
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Clone)]
pub struct ConsumerCredentials {
    pub key: String,
    pub secret: String,
}

impl fmt::Debug for ConsumerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerCredentials")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub secret: String,
}

impl TokenPair {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        TokenPair {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Durable access token obtained at the end of the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(TokenPair);

impl AccessToken {
    pub fn new(pair: TokenPair) -> Self {
        AccessToken(pair)
    }

    pub fn pair(&self) -> &TokenPair {
        &self.0
    }
}

#[automock]
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// First leg: obtain a temporary request token.
    async fn request_token(&self) -> Result<TokenPair, Error>;

    /// Second leg: page where the user approves the request token.
    fn authorize_url(&self, request_token: &TokenPair) -> String;

    /// Third leg: trade the verifier code for a durable access token.
    async fn access_token(
        &self,
        verifier: &str,
        request_token: &TokenPair,
    ) -> Result<AccessToken, Error>;

    /// `Authorization` header value for a request made with `token`.
    fn sign(&self, method: &Method, url: &Url, token: &TokenPair) -> Result<String, Error>;
}

pub struct Client {
    consumer: ConsumerCredentials,
    base_url: Url,
    authorize_base_url: Url,
    http_client: HTTPClient,
}

impl Client {
    pub fn new(
        consumer: ConsumerCredentials,
        base_url: Url,
        authorize_base_url: Url,
        http_client: HTTPClient,
    ) -> Self {
        Client {
            consumer,
            base_url,
            authorize_base_url,
            http_client,
        }
    }

    async fn token_request(
        &self,
        path: &str,
        token: Option<&TokenPair>,
        extra: &[(&str, &str)],
    ) -> Result<TokenPair, Error> {
        let url = self.base_url.join(path)?;

        let header = authorization_header(
            &Method::GET,
            &url,
            &self.consumer,
            token,
            extra,
            &nonce(),
            Utc::now().timestamp(),
        )?;

        let response = self
            .http_client
            .get(url.clone())
            .header(reqwest::header::AUTHORIZATION, header)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::OAuth(format!(
                "{} responded with status {}: {}",
                url.path(),
                status,
                body
            )));
        }

        debug!("token endpoint {} responded", url.path());

        parse_token_response(&body)
    }
}

#[async_trait]
impl Authorizer for Client {
    async fn request_token(&self) -> Result<TokenPair, Error> {
        self.token_request(REQUEST_TOKEN_PATH, None, &[("oauth_callback", "oob")])
            .await
    }

    fn authorize_url(&self, request_token: &TokenPair) -> String {
        let mut url = self.authorize_base_url.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.consumer.key)
            .append_pair("token", &request_token.token);
        url.to_string()
    }

    async fn access_token(
        &self,
        verifier: &str,
        request_token: &TokenPair,
    ) -> Result<AccessToken, Error> {
        let pair = self
            .token_request(
                ACCESS_TOKEN_PATH,
                Some(request_token),
                &[("oauth_verifier", verifier)],
            )
            .await?;

        Ok(AccessToken::new(pair))
    }

    fn sign(&self, method: &Method, url: &Url, token: &TokenPair) -> Result<String, Error> {
        authorization_header(
            method,
            url,
            &self.consumer,
            Some(token),
            &[],
            &nonce(),
            Utc::now().timestamp(),
        )
    }
}

fn nonce() -> String {
    Uuid::new_v4().simple().to_string()
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

fn oauth_parameters(
    consumer: &ConsumerCredentials,
    token: Option<&TokenPair>,
    extra: &[(&str, &str)],
    nonce: &str,
    timestamp: i64,
) -> Vec<(String, String)> {
    let mut parameters = vec![
        ("oauth_consumer_key".to_string(), consumer.key.clone()),
        ("oauth_nonce".to_string(), nonce.to_string()),
        ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
        ("oauth_timestamp".to_string(), timestamp.to_string()),
        ("oauth_version".to_string(), "1.0".to_string()),
    ];

    if let Some(token) = token {
        parameters.push(("oauth_token".to_string(), token.token.clone()));
    }

    for (key, value) in extra {
        parameters.push((key.to_string(), value.to_string()));
    }

    parameters
}

/// Signature base string: method, base URL and the sorted, encoded parameters.
pub fn signature_base_string(
    method: &Method,
    url: &Url,
    oauth_parameters: &[(String, String)],
) -> String {
    let mut parameters: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| (encode(&key), encode(&value)))
        .chain(
            oauth_parameters
                .iter()
                .map(|(key, value)| (encode(key), encode(value))),
        )
        .collect();

    parameters.sort();

    let normalized = parameters
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<String>>()
        .join("&");

    let mut base_url = url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    format!(
        "{}&{}&{}",
        method.as_str().to_uppercase(),
        encode(base_url.as_str()),
        encode(&normalized)
    )
}

pub fn sign_base_string(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, Error> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|err| Error::Signing(format!("failed to create signing key: {err}")))?;
    mac.update(base_string.as_bytes());

    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

fn authorization_header(
    method: &Method,
    url: &Url,
    consumer: &ConsumerCredentials,
    token: Option<&TokenPair>,
    extra: &[(&str, &str)],
    nonce: &str,
    timestamp: i64,
) -> Result<String, Error> {
    let mut parameters = oauth_parameters(consumer, token, extra, nonce, timestamp);

    let base_string = signature_base_string(method, url, &parameters);
    let token_secret = token.map(|token| token.secret.as_str()).unwrap_or_default();
    let signature = sign_base_string(&base_string, &consumer.secret, token_secret)?;

    parameters.push(("oauth_signature".to_string(), signature));
    parameters.sort();

    let fields = parameters
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
        .collect::<Vec<String>>()
        .join(",");

    Ok(format!("OAuth {fields}"))
}

fn parse_token_response(body: &str) -> Result<TokenPair, Error> {
    let mut token = None;
    let mut secret = None;

    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        match key.as_ref() {
            "oauth_token" => token = Some(value.into_owned()),
            "oauth_token_secret" => secret = Some(value.into_owned()),
            _ => {}
        }
    }

    match (token, secret) {
        (Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() => {
            Ok(TokenPair { token, secret })
        }
        _ => Err(Error::OAuth(
            "token response is missing oauth_token or oauth_token_secret".to_string(),
        )),
    }
}
