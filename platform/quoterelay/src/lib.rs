pub mod config;
pub mod errors;
pub mod routes;

use crate::config::Config;
use actix_web::dev::Server;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use newhighs::oauth::Client as OAuthClient;
use newhighs::provider::Client as ProviderClient;
use newhighs::storage::Client as StoreClient;
use newhighs::universe::FileUniverse;
use newhighs::{AccessToken, Authorizer, Pipeline};
use std::net::TcpListener;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared by every worker. The access token starts empty and is filled by
/// the `/access-token` route.
pub struct AppState {
    pub pipeline: Pipeline,
    pub authorizer: Arc<dyn Authorizer>,
    pub access_token: RwLock<Option<AccessToken>>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, authorizer: Arc<dyn Authorizer>) -> Self {
        AppState {
            pipeline,
            authorizer,
            access_token: RwLock::new(None),
        }
    }
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let http_client = reqwest::Client::builder()
        .timeout(config.pipeline.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let authorizer: Arc<dyn Authorizer> = Arc::new(OAuthClient::new(
        config.consumer.clone(),
        config.provider_base_url.clone(),
        config.authorize_url.clone(),
        http_client.clone(),
    ));

    let provider = ProviderClient::new(
        config.provider_base_url.clone(),
        authorizer.clone(),
        http_client.clone(),
    );

    let store = StoreClient::new(config.store_base_url.clone(), http_client);

    let pipeline = Pipeline::new(
        Arc::new(FileUniverse::new(config.symbols_path.clone())),
        Arc::new(provider),
        Arc::new(store),
        config.pipeline.clone(),
    );

    Ok(AppState::new(pipeline, authorizer))
}

pub fn run(listener: TcpListener, state: web::Data<AppState>) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(routes::health::handler)
            .service(routes::quotes::handler)
            .service(routes::auth::authorize_handler)
            .service(routes::auth::access_token_handler)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
