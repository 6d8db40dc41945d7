// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use axum::{routing::{get, post}, Router};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_session::DashboardSession;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::control_client::ControlClient;
use crate::infrastructure::http_history::HttpHistoryRepository;
use crate::infrastructure::notifier::LogNotifier;
use crate::infrastructure::websocket_transport::WebSocketTransport;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    disconnect, get_view, health_check, load_last_session, load_session, reconnect, save_config,
    show_live, start_cycle, stop_cycle, stream_view,
};

const COMMAND_QUEUE: usize = 32;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create adapters (infrastructure layer)
    let transport = Arc::new(WebSocketTransport::new(config.server.websocket_path.clone()));
    let history = Arc::new(HttpHistoryRepository::new(
        config.server.last_session_path.clone(),
        config.server.request_timeout(),
    )?);
    let notifier = Arc::new(LogNotifier::new(config.notify.bell));

    // Create the session (application layer)
    let session = DashboardSession::new(&config, transport, history, notifier);
    let view = session.subscribe();
    let (commands, commands_rx) = mpsc::channel(COMMAND_QUEUE);
    let session_task = tokio::spawn(session.run(commands_rx));

    // Create application state
    let state = Arc::new(AppState {
        view,
        commands,
        control: ControlClient::new(config.server.request_timeout())?,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/view", get(get_view))
        .route("/view/stream", get(stream_view))
        .route("/reconnect", post(reconnect))
        .route("/disconnect", post(disconnect))
        .route("/live", post(show_live))
        .route("/sessions/last", post(load_last_session))
        .route("/sessions/:name", post(load_session))
        .route("/control/start", post(start_cycle))
        .route("/control/stop", post(stop_cycle))
        .route("/control/config", post(save_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.view.listen_addr).await?;
    tracing::info!(
        listen_addr = %listener.local_addr()?,
        server = %config.server.address,
        "starting regenbox dashboard"
    );

    axum::serve(listener, router).await?;

    session_task.abort();
    Ok(())
}
