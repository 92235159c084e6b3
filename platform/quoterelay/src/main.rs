use actix_web::web;
use newhighs::logger::init_tracing;
use quoterelay::config::Config;
use quoterelay::{build_state, run};
use std::net::TcpListener;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let state = web::Data::new(build_state(&config)?);

    let listener = TcpListener::bind(("0.0.0.0", config.server_port))?;

    info!(
        port = config.server_port,
        symbols_path = %config.symbols_path.display(),
        batch_size = config.pipeline.batch_size,
        "starting quote relay"
    );

    run(listener, state)?.await?;

    Ok(())
}
