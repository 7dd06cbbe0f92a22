// web-server/src/main.rs
use actix_web::{web, App, HttpServer};
use cert_portal::{configure, AppState};
use common::{setup_tracing, Config};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    setup_tracing();

    let config = Config::load().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        io::Error::other(e)
    })?;
    let server_addr = config.listen_addr().map_err(io::Error::other)?;

    let state = AppState::from_config(&config)?;

    tracing::info!("Starting certificate portal on {}", server_addr);
    tracing::info!("Forwarding to certificate API at {}", config.api_url);
    tracing::info!("Staging uploads in {}", config.upload_dir.display());

    let state_data = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .configure(configure)
    })
    .bind(server_addr)?
    .run()
    .await
}
