// HTTP request handlers
use crate::application::dashboard_session::SessionCommand;
use crate::domain::view::DashboardView;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::Stream;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct ReconnectRequest {
    pub address: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current dashboard snapshot
pub async fn get_view(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.view.borrow().clone())
}

/// One event per published view, starting with the current one
pub async fn stream_view(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let mut view = state.view.clone();
    let stream = async_stream::stream! {
        loop {
            let snapshot = view.borrow_and_update().clone();
            yield Event::default().event("view").json_data(&snapshot);
            if view.changed().await.is_err() {
                break;
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn reconnect(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ReconnectRequest>>,
) -> StatusCode {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    send_command(
        &state,
        SessionCommand::Reconnect {
            address: request.address,
        },
    )
    .await
}

/// Drop the channel; the dashboard stays idle until the next reconnect
pub async fn disconnect(State(state): State<Arc<AppState>>) -> StatusCode {
    send_command(&state, SessionCommand::Close).await
}

pub async fn show_live(State(state): State<Arc<AppState>>) -> StatusCode {
    send_command(&state, SessionCommand::ShowLive).await
}

pub async fn load_last_session(State(state): State<Arc<AppState>>) -> StatusCode {
    send_command(&state, SessionCommand::LoadSession { name: None }).await
}

pub async fn load_session(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    send_command(&state, SessionCommand::LoadSession { name: Some(name) }).await
}

pub async fn start_cycle(State(state): State<Arc<AppState>>) -> Response {
    let address = state.server_address();
    match state.control.start(&address).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => bad_gateway("start", e),
    }
}

pub async fn stop_cycle(State(state): State<Arc<AppState>>) -> Response {
    let address = state.server_address();
    match state.control.stop(&address).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => bad_gateway("stop", e),
    }
}

/// Forward a cycle configuration and echo what the server saved
pub async fn save_config(
    State(state): State<Arc<AppState>>,
    Json(config): Json<serde_json::Value>,
) -> Response {
    let address = state.server_address();
    match state.control.save_config(&address, &config).await {
        Ok(saved) => Json(saved).into_response(),
        Err(e) => bad_gateway("config", e),
    }
}

async fn send_command(state: &AppState, command: SessionCommand) -> StatusCode {
    match state.commands.send(command).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::error!(command = ?e.0, "dashboard session is not running");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

fn bad_gateway(action: &str, error: anyhow::Error) -> Response {
    tracing::warn!(action, error = %format!("{:#}", error), "control request failed");
    (StatusCode::BAD_GATEWAY, format!("{:#}", error)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::control_client::ControlClient;
    use std::time::Duration;
    use tokio::sync::{mpsc, watch};

    fn state(address: &str) -> (Arc<AppState>, mpsc::Receiver<SessionCommand>, watch::Sender<DashboardView>) {
        let (view_tx, view) = watch::channel(DashboardView::new(address.to_string()));
        let (commands, commands_rx) = mpsc::channel(4);
        let state = Arc::new(AppState {
            view,
            commands,
            control: ControlClient::new(Duration::from_secs(5)).unwrap(),
        });
        (state, commands_rx, view_tx)
    }

    #[tokio::test]
    async fn test_commands_are_forwarded() {
        let (state, mut commands, _view) = state("localhost:3636");

        let status = reconnect(
            State(state.clone()),
            Some(Json(ReconnectRequest {
                address: Some("box:3636".to_string()),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(
            commands.recv().await,
            Some(SessionCommand::Reconnect {
                address: Some("box:3636".to_string())
            })
        );

        load_session(Path("cycle.log".to_string()), State(state.clone())).await;
        assert_eq!(
            commands.recv().await,
            Some(SessionCommand::LoadSession {
                name: Some("cycle.log".to_string())
            })
        );

        assert_eq!(reconnect(State(state.clone()), None).await, StatusCode::ACCEPTED);
        assert_eq!(
            commands.recv().await,
            Some(SessionCommand::Reconnect { address: None })
        );

        assert_eq!(disconnect(State(state)).await, StatusCode::ACCEPTED);
        assert_eq!(commands.recv().await, Some(SessionCommand::Close));
    }

    #[tokio::test]
    async fn test_stopped_session_is_unavailable() {
        let (state, commands, _view) = state("localhost:3636");
        drop(commands);
        assert_eq!(show_live(State(state)).await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unreachable_control_is_bad_gateway() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let (state, _commands, _view) = state(&address);
        assert_eq!(start_cycle(State(state)).await.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_view_follows_published_snapshot() {
        let (state, _commands, view_tx) = state("localhost:3636");
        view_tx.send_modify(|view| view.connection.address = "box:3636".to_string());

        let Json(view) = get_view(State(state.clone())).await;
        assert_eq!(view.connection.address, "box:3636");
        assert_eq!(state.server_address(), "box:3636");
    }
}
