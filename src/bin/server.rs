use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use maze_chase_server::config::ServerConfig;
use maze_chase_server::constants::{CLIENT_QUEUE_CAPACITY, COMMAND_QUEUE_CAPACITY};
use maze_chase_server::engine::GameEngine;
use maze_chase_server::game_server::{make_id, Command, GameServer, OutboundMessage};
use maze_chase_server::highscore_store::HighscoreStore;
use maze_chase_server::server_protocol::parse_client_message;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};

#[derive(Clone)]
struct AppState {
    commands: mpsc::Sender<Command>,
    highscores: Arc<Mutex<HighscoreStore>>,
}

#[derive(Debug, Deserialize)]
struct HighscoreSubmission {
    score: u32,
    #[serde(default)]
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let config = ServerConfig::parse();

    let maze = config.load_maze()?;
    let engine = GameEngine::new(maze, config.engine_options());
    tracing::info!(
        game_code = engine.game_code(),
        policy = ?config.game_code_policy,
        idle_chasers = config.idle_chasers,
        "session created"
    );

    let (commands, command_rx) = mpsc::channel::<Command>(COMMAND_QUEUE_CAPACITY);
    tokio::spawn(GameServer::new(engine, config.server_options()).run(command_rx));

    let state = AppState {
        commands,
        highscores: Arc::new(Mutex::new(HighscoreStore::new(
            config.highscore_path.clone(),
        ))),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/highscore", get(get_highscore).post(post_highscore))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = config.resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        tracing::info!(path = %static_dir.display(), "serving static files");
        app.fallback_service(ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)))
    } else {
        tracing::warn!("no static file root found, serving the api only");
        app
    };

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(port = config.port, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn get_highscore(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.highscores.lock().await;
    Json(store.current())
}

async fn post_highscore(
    State(state): State<AppState>,
    Json(submission): Json<HighscoreSubmission>,
) -> Response {
    let mut store = state.highscores.lock().await;
    match store.submit(submission.score, &submission.name) {
        Ok(response) => Json(response).into_response(),
        Err(error) => {
            tracing::error!(%error, "failed to persist highscore");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to persist highscore" })),
            )
                .into_response()
        }
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Bridges one WebSocket to the simulation task. The reader parses frames into
/// commands; the writer drains this client's outbound queue.
async fn handle_socket(state: AppState, socket: WebSocket) {
    let player_id = make_id("player");
    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(CLIENT_QUEUE_CAPACITY);
    let connect = Command::Connect {
        player_id: player_id.clone(),
        tx,
    };
    if state.commands.send(connect).await.is_err() {
        tracing::warn!(player_id = %player_id, "simulation stopped, refusing connection");
        return;
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let mut writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let should_close = matches!(outbound, OutboundMessage::Close { .. });
            let result = match outbound {
                OutboundMessage::Text(payload) => {
                    ws_sender.send(Message::Text(payload.into())).await
                }
                OutboundMessage::Close { code, reason } => {
                    let frame = CloseFrame {
                        code,
                        reason: reason.into(),
                    };
                    ws_sender.send(Message::Close(Some(frame))).await
                }
            };
            if result.is_err() || should_close {
                break;
            }
        }
    });

    let commands = state.commands.clone();
    let reader_id = player_id.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(received) = ws_receiver.next().await {
            let Ok(message) = received else {
                break;
            };
            let raw = match message {
                Message::Text(raw) => raw.to_string(),
                Message::Binary(raw) => match String::from_utf8(raw.to_vec()) {
                    Ok(text) => text,
                    Err(_) => {
                        tracing::debug!(player_id = %reader_id, "ignoring non-utf8 frame");
                        continue;
                    }
                },
                Message::Close(_) => break,
                _ => continue,
            };
            match parse_client_message(&raw) {
                Ok(message) => {
                    let command = Command::Message {
                        player_id: reader_id.clone(),
                        message,
                    };
                    if commands.send(command).await.is_err() {
                        break;
                    }
                }
                Err(error) => {
                    tracing::warn!(player_id = %reader_id, %error, "ignoring malformed message");
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    let _ = state
        .commands
        .send(Command::Disconnect { player_id })
        .await;
}
