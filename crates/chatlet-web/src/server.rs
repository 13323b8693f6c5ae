use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use chatlet_core::repositories::{
    InMemorySelectedModelRepository, JsonSelectedModelRepository, SelectedModelRepository,
};
use chatlet_core::services::{HttpChatService, ModelSource};
use chatlet_core::{ChatController, ControllerConfig, SurfaceCommand, UiEvent};

use crate::models_file::FileModelSource;
use crate::shell::SHELL_HTML;
use crate::surface::WsSurface;

/// Everything a connection needs to assemble its own controller instance.
pub struct AppState {
    pub models_path: PathBuf,
    pub api_base: String,
    pub api_key: Option<String>,
    pub config: ControllerConfig,
}

impl AppState {
    pub fn new(
        models_path: PathBuf,
        api_base: String,
        api_key: Option<String>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            models_path,
            api_base,
            api_key,
            config,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(shell_page))
        .route("/models.json", get(models_json))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

async fn shell_page() -> Html<&'static str> {
    Html(SHELL_HTML)
}

async fn models_json(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match FileModelSource::new(state.models_path.clone()).load().await {
        Ok(models) => Json(models).into_response(),
        Err(err) => {
            warn!(error = %err, "failed to serve model list");
            (StatusCode::INTERNAL_SERVER_ERROR, "model list unavailable").into_response()
        }
    }
}

async fn ws_upgrade(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One connected shell gets one controller task. The socket carries
/// `SurfaceCommand` JSON outbound and `UiEvent` JSON inbound; all widget
/// state lives in the controller task.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    info!("shell connected");
    let (mut sink, mut source) = socket.split();

    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<SurfaceCommand>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<UiEvent>();

    let surface = Arc::new(WsSurface::new(cmd_tx));
    let chat = Arc::new(HttpChatService::new(
        state.api_base.clone(),
        state.api_key.clone(),
    ));
    let repo: Arc<dyn SelectedModelRepository> = match JsonSelectedModelRepository::new() {
        Ok(repo) => Arc::new(repo),
        Err(err) => {
            warn!(error = %err, "no config directory, model selection will not persist");
            Arc::new(InMemorySelectedModelRepository::new())
        }
    };

    let mut controller = ChatController::new(
        surface.clone(),
        chat,
        surface.clone(),
        repo,
        state.config,
    );
    controller
        .init_models(&FileModelSource::new(state.models_path.clone()))
        .await;
    let controller_task = tokio::spawn(controller.run(event_rx));

    // Outbound half: serialize surface commands onto the socket.
    let writer = tokio::spawn(async move {
        while let Some(command) = cmd_rx.recv().await {
            let json = match serde_json::to_string(&command) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to encode surface command");
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound half: decode shell events into the controller.
    while let Some(message) = source.next().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                debug!(error = %err, "websocket read error");
                break;
            }
        };
        match message {
            Message::Text(text) => match serde_json::from_str::<UiEvent>(&text) {
                Ok(event) => {
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
                Err(err) => warn!(error = %err, "unrecognized shell event"),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Closing the event channel lets the controller finish its current cycle
    // and return; dropping the controller closes the command channel, which
    // ends the writer.
    drop(event_tx);
    if let Err(err) = controller_task.await {
        warn!(error = %err, "controller task failed");
    }
    let _ = writer.await;
    info!("shell disconnected");
}
