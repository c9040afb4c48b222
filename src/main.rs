mod api;
mod app;
mod commands;
mod config;
mod error;
mod handlers;
mod models;
mod notify;
mod render;
mod tasks;
mod voting;

use api::{HttpPollApi, PollApi};
use app::ClientState;
use config::ClientConfig;
use handlers::{EventLoop, FileScreen, Screen, StdoutScreen};
use log::{info, warn};
use std::sync::Arc;
use tasks::push_listener::{WsConnector, run_push_listener};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = ClientConfig::from_env()?;
    let api = Arc::new(HttpPollApi::new(config.api_url.clone(), config.request_timeout)?);

    match api.health().await {
        Ok(status) => info!("Poll service is {}: {}", status.status, status.message),
        Err(e) => warn!("Poll service health check failed: {}", e),
    }

    let screen: Box<dyn Screen> = match &config.view_file {
        Some(path) => Box::new(FileScreen::new(path.clone())),
        None => Box::new(StdoutScreen),
    };
    let event_loop = EventLoop::new(api, screen, ClientState::new(config.notification_ttl));

    // Push channel lives for the whole process and reconnects on its own
    let connector = WsConnector::new(config.push_url.clone());
    tokio::spawn(run_push_listener(connector, event_loop.sender(), config.reconnect_delay));

    tokio::spawn(commands::read_commands(event_loop.sender()));
    eprintln!("{}", commands::USAGE);

    event_loop.run().await;
    Ok(())
}
