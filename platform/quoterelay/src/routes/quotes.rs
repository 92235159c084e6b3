use crate::errors::ApiError;
use crate::AppState;
use actix_web::{get, web, HttpResponse};
use tracing::info;

/// Run one pull. Responds with the stored records, or `null` when no quote
/// survived this run.
#[get("/quotes")]
pub async fn handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let access_token = state.access_token.read().await.clone();

    info!(authorized = access_token.is_some(), "quotes handler called");

    let outcome = state.pipeline.run(access_token).await?;

    Ok(HttpResponse::Ok().json(outcome.into_json()))
}
