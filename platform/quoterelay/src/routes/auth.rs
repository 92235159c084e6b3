use crate::errors::ApiError;
use crate::AppState;
use actix_web::{get, post, web, HttpResponse};
use newhighs::TokenPair;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AuthorizeResponse {
    authorize_url: String,
    oauth_token: String,
    oauth_token_secret: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct AccessTokenPayload {
    verifier: Option<String>,
    oauth_token: Option<String>,
    oauth_token_secret: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", name)))
}

/// Start the handshake: fetch a request token and hand back the page the
/// account holder must visit.
#[get("/authorize")]
pub async fn authorize_handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let request_token = state
        .authorizer
        .request_token()
        .await
        .map_err(ApiError::Upstream)?;

    let authorize_url = state.authorizer.authorize_url(&request_token);

    info!("request token issued");

    Ok(HttpResponse::Ok().json(AuthorizeResponse {
        authorize_url,
        oauth_token: request_token.token,
        oauth_token_secret: request_token.secret,
    }))
}

#[post("/access-token")]
pub async fn access_token_handler(
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let payload: AccessTokenPayload = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))?;

    let verifier = required(payload.verifier, "verifier")?;
    let request_token = TokenPair::new(
        required(payload.oauth_token, "oauthToken")?,
        required(payload.oauth_token_secret, "oauthTokenSecret")?,
    );

    let access_token = state
        .authorizer
        .access_token(&verifier, &request_token)
        .await
        .map_err(|e| {
            warn!("access token exchange failed: {}", e);
            ApiError::Upstream(e)
        })?;

    *state.access_token.write().await = Some(access_token);

    info!("access token stored");

    Ok(HttpResponse::Ok().json(json!({ "authorized": true })))
}
