// Main entry point - Dependency injection and session startup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::events::RenderEvent;
use crate::application::session::DashboardSession;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_gateway::HttpDeviceClient;
use crate::infrastructure::ws_channel::WebSocketConnector;
use crate::presentation::console::{read_intents, render_events, HELP};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_dashboard_config()?;
    let origin = config.device.origin_url()?;
    let endpoint = config.device.channel_endpoint()?;

    // Create adapters (infrastructure layer)
    let device = Arc::new(HttpDeviceClient::new(
        origin,
        config.commands.request_timeout(),
    )?);
    let connector = Arc::new(WebSocketConnector::new());

    let (render_tx, render_rx) = mpsc::unbounded_channel();
    let (intent_tx, intent_rx) = mpsc::channel(16);

    // Settings are fetched once and never touch the snapshot/toggle machinery
    let settings_client = device.clone();
    let settings_tx = render_tx.clone();
    tokio::spawn(async move {
        match settings_client.fetch_settings().await {
            Ok(settings) => {
                let _ = settings_tx.send(RenderEvent::Settings(settings));
            }
            Err(e) => tracing::warn!(error = %e, "settings fetch failed"),
        }
    });

    // Create session (application layer)
    let session = DashboardSession::new(
        endpoint.clone(),
        connector,
        device,
        config.watchdog.silence_timeout(),
        render_tx,
    )
    .with_reconnect_delay(config.watchdog.reconnect_delay());

    // Console front-end (presentation layer)
    tokio::spawn(render_events(render_rx));
    tokio::spawn(read_intents(intent_tx));

    println!("Starting fuel-cell dashboard against {}", endpoint);
    println!("{}", HELP);

    session.run(intent_rx).await;

    Ok(())
}
