use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};
use mural_one::config::PortalConfig;
use mural_one::session::spawn_sweeper;
use mural_one::PortalState;
use std::process;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match PortalConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Refusing to start: {}", e);
            process::exit(1);
        }
    };

    let state = match PortalState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("Refusing to start: {}", e);
            process::exit(1);
        }
    };

    info!(
        "{} accounts loaded, sessions last {} minutes",
        config.credentials.accounts().len(),
        config.session_ttl.num_minutes()
    );
    if !state.relay.is_configured() {
        warn!("OPENAI_API_KEY is not set, /api/chat will answer 503");
    }

    let sweeper = spawn_sweeper(state.authority.clone(), config.sweep_interval);

    info!("Listening on {}:{}", config.host, config.port);
    let server_state = state.clone();
    let result = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| server_state.configure(cfg))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    sweeper.abort();
    result
}
