mod api;
mod chain;
mod config;
mod engine;
mod ws;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::error;

use api::AppState;
use config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    println!(
        "⛏️ Starting productive mining API at http://{}:{} (ws://{}:{}{})",
        config.host,
        config.port,
        config.host,
        config.ws_port,
        ws::server::WS_PATH
    );

    let state = Arc::new(AppState {
        dev_mode: config.is_dev(),
        ..AppState::default()
    });

    {
        let state = state.clone();
        let host = config.host.clone();
        let ws_port = config.ws_port;
        tokio::spawn(async move {
            if let Err(e) = ws::server::run(&host, ws_port, state).await {
                error!("WS - server exited: {e}");
            }
        });
    }

    engine::spawn_drivers(state.clone(), &config);

    let data = web::Data::from(state);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
