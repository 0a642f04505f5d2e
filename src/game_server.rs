use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::time::MissedTickBehavior;

use crate::constants::{CELL_SIZE, TICK_MS, TICK_RATE};
use crate::engine::GameEngine;
use crate::error::LifecycleError;
use crate::registry::ConnectionRegistry;
use crate::server_protocol::{
    AvailableColors, ClientMessage, GameStatePayload, MazeView, ServerMessage,
};
use crate::server_utils::{now_ms, GameCodePolicy};
use crate::types::{EngineEvent, GamePhase};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    Close { code: u16, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueuePolicy {
    /// Per-tick state: a full queue skips this copy.
    DropOnFull,
    /// Discrete events: a client that cannot take them is disconnected.
    DisconnectOnFull,
}

/// Requests from connection tasks. Applied by the simulation task at the start
/// of the next tick.
#[derive(Debug)]
pub enum Command {
    Connect {
        player_id: String,
        tx: mpsc::Sender<OutboundMessage>,
    },
    Message {
        player_id: String,
        message: ClientMessage,
    },
    Disconnect {
        player_id: String,
    },
}

#[derive(Clone, Debug)]
pub struct GameServerOptions {
    pub game_code_policy: GameCodePolicy,
    /// Seconds a finished game stays on screen before it resets itself.
    /// `0` keeps it until someone restarts.
    pub auto_reset_secs: u64,
}

/// Owns the engine, the registry and every client queue. Nothing else
/// mutates game state.
pub struct GameServer {
    engine: GameEngine,
    registry: ConnectionRegistry,
    clients: HashMap<String, mpsc::Sender<OutboundMessage>>,
    auto_reset_ticks: Option<u64>,
}

impl GameServer {
    pub fn new(engine: GameEngine, options: GameServerOptions) -> Self {
        let registry = ConnectionRegistry::new(engine.chaser_count(), options.game_code_policy);
        let auto_reset_ticks =
            (options.auto_reset_secs > 0).then(|| options.auto_reset_secs * u64::from(TICK_RATE));
        Self {
            engine,
            registry,
            clients: HashMap::new(),
            auto_reset_ticks,
        }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Fixed-rate loop: drain queued commands, then advance one tick.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            loop {
                match commands.try_recv() {
                    Ok(command) => self.handle_command(command),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        tracing::info!("command channel closed, stopping simulation");
                        return;
                    }
                }
            }
            self.tick();
        }
    }

    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect { player_id, tx } => self.connect(player_id, tx),
            Command::Message {
                player_id,
                message,
            } => self.handle_message(&player_id, message),
            Command::Disconnect { player_id } => {
                if self.disconnect_internal(&player_id) {
                    self.broadcast_state();
                }
            }
        }
        self.flush_events();
    }

    /// One simulation step followed by event fan-out and the state broadcast.
    pub fn tick(&mut self) {
        self.engine.step(TICK_MS);
        self.flush_events();

        if let (Some(limit), Some(elapsed)) = (self.auto_reset_ticks, self.engine.ticks_since_end()) {
            if elapsed >= limit {
                tracing::info!(after_ticks = elapsed, "auto-resetting finished game");
                if self.reset_session().is_ok() {
                    self.broadcast(&ServerMessage::GameReset, QueuePolicy::DisconnectOnFull);
                }
            }
        }

        self.broadcast_state();
    }

    fn connect(&mut self, player_id: String, tx: mpsc::Sender<OutboundMessage>) {
        self.registry.register(&player_id);
        self.clients.insert(player_id.clone(), tx);
        tracing::info!(
            player_id = %player_id,
            players = self.registry.len(),
            "client connected"
        );

        let maze = self.engine.maze();
        let connected = ServerMessage::Connected {
            player_id: player_id.clone(),
            maze: MazeView {
                width: maze.width(),
                height: maze.height(),
                cell_size: CELL_SIZE,
                tiles: maze.tiles(),
            },
        };
        self.send_to(&player_id, &connected, QueuePolicy::DisconnectOnFull);
        let state = self.state_message();
        self.send_to(&player_id, &state, QueuePolicy::DropOnFull);
    }

    fn handle_message(&mut self, player_id: &str, message: ClientMessage) {
        if !self.registry.contains(player_id) {
            tracing::debug!(player_id, "message from a disconnected player ignored");
            return;
        }

        if let Some(update) = message.config_update() {
            let config = self.engine.apply_config(&update).clone();
            tracing::info!(player_id, ?update, "config updated");
            self.broadcast(
                &ServerMessage::ConfigUpdated { config },
                QueuePolicy::DisconnectOnFull,
            );
            return;
        }

        match message {
            ClientMessage::GameState => {
                let state = self.state_message();
                self.send_to(player_id, &state, QueuePolicy::DropOnFull);
            }
            ClientMessage::Join(request) => {
                match self.registry.join(player_id, &request, self.engine.game_code()) {
                    Ok(outcome) => {
                        if let Some(released) = outcome.released {
                            self.engine.release_chaser(released);
                        }
                        self.engine.assign_chaser(outcome.color_index, player_id);
                        tracing::info!(
                            player_id,
                            color_index = outcome.color_index,
                            player_name = %outcome.player_name,
                            "player joined"
                        );
                        self.send_to(
                            player_id,
                            &ServerMessage::Joined {
                                color_index: outcome.color_index,
                                player_name: outcome.player_name,
                            },
                            QueuePolicy::DisconnectOnFull,
                        );
                        self.broadcast_state();
                    }
                    Err(err) => {
                        tracing::debug!(player_id, error = %err, "join rejected");
                        self.send_to(
                            player_id,
                            &ServerMessage::JoinFailed {
                                reason: err.to_string(),
                            },
                            QueuePolicy::DisconnectOnFull,
                        );
                    }
                }
            }
            ClientMessage::Input { dir } => {
                let accepted = self
                    .registry
                    .assigned_color(player_id)
                    .is_some_and(|color| self.engine.set_chaser_input(color, dir));
                if !accepted {
                    tracing::debug!(player_id, ?dir, "input from a player without a chaser");
                }
            }
            ClientMessage::StartGame => match self.engine.start(now_ms()) {
                Ok(()) => {
                    let start_timestamp = self.engine.build_snapshot().session.start_timestamp;
                    self.broadcast(
                        &ServerMessage::GameStarted { start_timestamp },
                        QueuePolicy::DisconnectOnFull,
                    );
                    self.broadcast_state();
                }
                Err(err) => self.reject(player_id, err.to_string()),
            },
            ClientMessage::EndGame => {
                if self.engine.phase() != GamePhase::Running {
                    tracing::debug!(
                        player_id,
                        phase = ?self.engine.phase(),
                        "end request without a running game"
                    );
                } else if let Err(err) = self.engine.end_game() {
                    self.reject(player_id, err.to_string());
                }
            }
            ClientMessage::RestartGame => match self.reset_session() {
                Ok(()) => {
                    self.broadcast(&ServerMessage::GameRestarted, QueuePolicy::DisconnectOnFull);
                    self.broadcast_state();
                }
                Err(err) => self.reject(player_id, err.to_string()),
            },
            ClientMessage::SelectChaser {
                color_index,
                player_name,
            } => match self
                .registry
                .request_selection(player_id, color_index, &player_name)
            {
                Ok(slot) => {
                    tracing::debug!(player_id, color_index = slot, "chaser selected");
                    self.broadcast_state();
                }
                Err(err) => self.send_to(
                    player_id,
                    &ServerMessage::SelectionFailed {
                        reason: err.to_string(),
                    },
                    QueuePolicy::DisconnectOnFull,
                ),
            },
            ClientMessage::CancelSelection => {
                if self.registry.cancel_selection(player_id).is_some() {
                    self.broadcast_state();
                }
            }
            ClientMessage::SetAiDifficulty { .. }
            | ClientMessage::SetSpeeds { .. }
            | ClientMessage::SetGameDuration { .. } => {}
        }
    }

    fn reject(&mut self, player_id: &str, message: String) {
        tracing::warn!(player_id, reason = %message, "lifecycle request rejected");
        self.send_to(
            player_id,
            &ServerMessage::Error { message },
            QueuePolicy::DisconnectOnFull,
        );
    }

    /// Back to Idle with all chaser control and selections dropped.
    fn reset_session(&mut self) -> Result<(), LifecycleError> {
        self.engine.reset()?;
        self.registry.release_all_assignments();
        Ok(())
    }

    fn flush_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                EngineEvent::FugitiveCaught {
                    fugitive_index,
                    chaser_indices,
                    team_score,
                } => {
                    for &color in &chaser_indices {
                        if let Some(player_id) = self.registry.credit_catch(color) {
                            tracing::debug!(player_id = %player_id, color_index = color, "catch credited");
                        }
                    }
                    self.broadcast(
                        &ServerMessage::Caught {
                            fugitive_index,
                            chaser_indices,
                            team_score,
                        },
                        QueuePolicy::DisconnectOnFull,
                    );
                }
                EngineEvent::GameEnded(summary) => {
                    self.broadcast(&ServerMessage::GameEnd(summary), QueuePolicy::DisconnectOnFull);
                }
            }
        }
    }

    /// Removes the client and frees its chaser. Returns false for unknown ids.
    fn disconnect_internal(&mut self, player_id: &str) -> bool {
        let Some(tx) = self.clients.remove(player_id) else {
            return false;
        };
        let _ = tx.try_send(OutboundMessage::Close {
            code: 1000,
            reason: "disconnected".to_string(),
        });
        if let Some(player) = self.registry.remove(player_id) {
            if let Some(color) = player.assigned_color_index {
                self.engine.release_chaser(color);
            }
        }
        tracing::info!(player_id, players = self.registry.len(), "client disconnected");

        if self.clients.is_empty() && self.engine.phase() != GamePhase::Idle {
            tracing::info!("last client left, resetting session");
            if let Err(err) = self.reset_session() {
                tracing::warn!(error = %err, "reset after last disconnect failed");
            }
        }
        true
    }

    pub fn state_message(&self) -> ServerMessage {
        let snapshot = self.engine.build_snapshot();
        ServerMessage::GameState(GameStatePayload {
            tick: snapshot.tick,
            players: self.registry.roster(),
            chaser_selections: self.registry.selections().clone(),
            available_colors: AvailableColors {
                chasers: self.registry.available_chasers(),
                fugitives: (0..self.engine.fugitive_count()).collect(),
            },
            game_started: self.engine.phase() == GamePhase::Running,
            session: snapshot.session,
            positions: snapshot.positions,
        })
    }

    fn broadcast_state(&mut self) {
        let state = self.state_message();
        self.broadcast(&state, QueuePolicy::DropOnFull);
    }

    fn send_to(&mut self, player_id: &str, message: &ServerMessage, policy: QueuePolicy) {
        let payload = match message.encode() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode server message");
                return;
            }
        };
        let failed = match self.clients.get(player_id) {
            Some(tx) => should_disconnect(tx.try_send(OutboundMessage::Text(payload)), policy),
            None => false,
        };
        if failed {
            tracing::warn!(player_id, "client queue unavailable, disconnecting");
            if self.disconnect_internal(player_id) {
                self.broadcast_state();
            }
        }
    }

    fn broadcast(&mut self, message: &ServerMessage, policy: QueuePolicy) {
        let payload = match message.encode() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode server message");
                return;
            }
        };
        let failed: Vec<String> = self
            .clients
            .iter()
            .filter(|(_, tx)| {
                should_disconnect(tx.try_send(OutboundMessage::Text(payload.clone())), policy)
            })
            .map(|(player_id, _)| player_id.clone())
            .collect();
        for player_id in failed {
            tracing::warn!(player_id = %player_id, "client queue unavailable, disconnecting");
            self.disconnect_internal(&player_id);
        }
    }
}

/// A closed queue always means the client is gone; a full one only matters
/// for messages that must not be skipped.
fn should_disconnect(result: Result<(), TrySendError<OutboundMessage>>, policy: QueuePolicy) -> bool {
    match result {
        Ok(()) => false,
        Err(TrySendError::Closed(_)) => true,
        Err(TrySendError::Full(_)) => policy == QueuePolicy::DisconnectOnFull,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameEngineOptions;
    use crate::maze::Maze;

    fn server() -> GameServer {
        let engine = GameEngine::new(
            Maze::parse("#####\n#F#C#\n#####").expect("layout"),
            GameEngineOptions::default(),
        );
        GameServer::new(
            engine,
            GameServerOptions {
                game_code_policy: GameCodePolicy::Label,
                auto_reset_secs: 1,
            },
        )
    }

    fn drain_types(rx: &mut mpsc::Receiver<OutboundMessage>) -> Vec<String> {
        let mut types = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let OutboundMessage::Text(text) = message {
                let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
                types.push(value["type"].as_str().unwrap_or_default().to_string());
            }
        }
        types
    }

    #[test]
    fn make_id_is_sequential_per_process() {
        let a = make_id("player");
        let b = make_id("player");
        assert!(a.starts_with("player_"));
        assert_ne!(a, b);
    }

    #[test]
    fn connect_sends_identity_then_state() {
        let mut server = server();
        let (tx, mut rx) = mpsc::channel(16);
        server.handle_command(Command::Connect {
            player_id: "player_1".to_string(),
            tx,
        });
        assert_eq!(drain_types(&mut rx), vec!["connected", "gameState"]);
    }

    #[test]
    fn full_queue_drops_state_but_disconnects_on_events() {
        let mut server = server();
        let (tx, mut rx) = mpsc::channel(2);
        server.handle_command(Command::Connect {
            player_id: "player_1".to_string(),
            tx,
        });
        // Queue now holds `connected` and `gameState`.
        server.tick();
        assert_eq!(server.client_count(), 1);

        server.handle_command(Command::Message {
            player_id: "player_1".to_string(),
            message: ClientMessage::StartGame,
        });
        assert_eq!(server.client_count(), 0);
        assert!(server.registry().is_empty());
        assert_eq!(drain_types(&mut rx), vec!["connected", "gameState"]);
    }

    #[test]
    fn closed_queue_disconnects_even_for_state() {
        let mut server = server();
        let (tx, rx) = mpsc::channel(16);
        server.handle_command(Command::Connect {
            player_id: "player_1".to_string(),
            tx,
        });
        drop(rx);
        server.tick();
        assert_eq!(server.client_count(), 0);
    }

    #[test]
    fn finished_game_resets_itself_after_the_delay() {
        let mut server = server();
        let (tx, mut rx) = mpsc::channel(256);
        server.handle_command(Command::Connect {
            player_id: "player_1".to_string(),
            tx,
        });
        server.handle_command(Command::Message {
            player_id: "player_1".to_string(),
            message: ClientMessage::StartGame,
        });
        server.handle_command(Command::Message {
            player_id: "player_1".to_string(),
            message: ClientMessage::EndGame,
        });
        assert_eq!(server.engine().phase(), GamePhase::Ended);
        drain_types(&mut rx);

        for _ in 0..TICK_RATE {
            server.tick();
        }
        assert_eq!(server.engine().phase(), GamePhase::Idle);
        let types = drain_types(&mut rx);
        assert!(types.contains(&"gameReset".to_string()));
    }

    #[test]
    fn invalid_lifecycle_request_answers_with_error() {
        let mut server = server();
        let (tx, mut rx) = mpsc::channel(16);
        server.handle_command(Command::Connect {
            player_id: "player_1".to_string(),
            tx,
        });
        server.handle_command(Command::Message {
            player_id: "player_1".to_string(),
            message: ClientMessage::RestartGame,
        });
        let types = drain_types(&mut rx);
        assert_eq!(types.last().map(String::as_str), Some("error"));
        assert_eq!(server.engine().phase(), GamePhase::Idle);
    }

    #[test]
    fn end_request_outside_a_running_game_is_ignored() {
        let mut server = server();
        let (tx, mut rx) = mpsc::channel(16);
        server.handle_command(Command::Connect {
            player_id: "player_1".to_string(),
            tx,
        });
        drain_types(&mut rx);
        server.handle_command(Command::Message {
            player_id: "player_1".to_string(),
            message: ClientMessage::EndGame,
        });
        assert!(drain_types(&mut rx).is_empty());
        assert_eq!(server.engine().phase(), GamePhase::Idle);
        assert_eq!(server.client_count(), 1);
    }

    #[test]
    fn last_disconnect_resets_a_running_game() {
        let mut server = server();
        let (tx, _rx) = mpsc::channel(64);
        server.handle_command(Command::Connect {
            player_id: "player_1".to_string(),
            tx,
        });
        server.handle_command(Command::Message {
            player_id: "player_1".to_string(),
            message: ClientMessage::StartGame,
        });
        assert_eq!(server.engine().phase(), GamePhase::Running);
        server.handle_command(Command::Disconnect {
            player_id: "player_1".to_string(),
        });
        assert_eq!(server.engine().phase(), GamePhase::Idle);
    }

    fn connect(server: &mut GameServer, player_id: &str) -> mpsc::Receiver<OutboundMessage> {
        let (tx, rx) = mpsc::channel(256);
        server.handle_command(Command::Connect {
            player_id: player_id.to_string(),
            tx,
        });
        rx
    }

    fn send(server: &mut GameServer, player_id: &str, message: ClientMessage) {
        server.handle_command(Command::Message {
            player_id: player_id.to_string(),
            message,
        });
    }

    fn drain_json(rx: &mut mpsc::Receiver<OutboundMessage>) -> Vec<serde_json::Value> {
        let mut values = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let OutboundMessage::Text(text) = message {
                values.push(serde_json::from_str(&text).expect("valid json"));
            }
        }
        values
    }

    fn join_chaser(color_index: i64, name: &str) -> ClientMessage {
        ClientMessage::Join(crate::registry::JoinRequest {
            character_type: Some(crate::types::CharacterType::Chaser),
            color_index,
            player_name: name.to_string(),
            game_code: "42".to_string(),
        })
    }

    #[test]
    fn second_join_on_a_taken_slot_fails() {
        let mut server = server();
        let mut first = connect(&mut server, "player_1");
        let mut second = connect(&mut server, "player_2");
        drain_json(&mut first);
        drain_json(&mut second);

        send(&mut server, "player_1", join_chaser(0, "abc"));
        let joined = drain_json(&mut first);
        assert_eq!(joined[0]["type"], "joined");
        assert_eq!(joined[0]["colorIndex"], 0);
        assert_eq!(joined[0]["playerName"], "ABC");

        send(&mut server, "player_2", join_chaser(0, "bob"));
        let replies = drain_json(&mut second);
        let failed = replies
            .iter()
            .find(|value| value["type"] == "joinFailed")
            .expect("joinFailed reply");
        assert!(failed["reason"].as_str().is_some_and(|reason| !reason.is_empty()));
        assert_eq!(server.engine().chaser_controller(0), Some("player_1"));
    }

    #[test]
    fn one_second_game_ends_on_time() {
        let mut server = server();
        let mut rx = connect(&mut server, "player_1");
        send(&mut server, "player_1", ClientMessage::SetGameDuration { duration_seconds: 1 });
        send(&mut server, "player_1", ClientMessage::StartGame);
        drain_json(&mut rx);

        for _ in 0..TICK_RATE {
            server.tick();
        }
        assert_eq!(server.engine().phase(), GamePhase::Ended);

        let messages = drain_json(&mut rx);
        let end = messages
            .iter()
            .find(|value| value["type"] == "gameEnd")
            .expect("gameEnd broadcast");
        assert_eq!(end["allCaught"], false);
        assert_eq!(end["fugitivesCaught"], 0);
        assert_eq!(end["score"], 0);
        assert_eq!(end["gameTime"], 1.0);
    }

    #[test]
    fn input_into_a_wall_keeps_the_chaser_still() {
        let mut server = server();
        let mut rx = connect(&mut server, "player_1");
        send(&mut server, "player_1", join_chaser(0, "ann"));
        send(&mut server, "player_1", ClientMessage::StartGame);
        send(&mut server, "player_1", ClientMessage::Input { dir: crate::types::Direction::Right });
        server.tick();

        let messages = drain_json(&mut rx);
        let state = messages
            .iter()
            .rev()
            .find(|value| value["type"] == "gameState")
            .expect("state broadcast");
        let chaser = &state["positions"]["chasers"][0];
        assert_eq!(chaser["gridPos"], chaser["targetPos"]);
        assert_eq!(chaser["targetPos"]["x"], 3);
        assert_eq!(chaser["targetPos"]["y"], 1);
        assert_eq!(chaser["isPlayerControlled"], true);
    }

    #[test]
    fn repeated_state_requests_are_identical() {
        let mut server = server();
        let mut rx = connect(&mut server, "player_1");
        drain_json(&mut rx);
        send(&mut server, "player_1", ClientMessage::GameState);
        send(&mut server, "player_1", ClientMessage::GameState);
        let states = drain_json(&mut rx);
        assert_eq!(states.len(), 2);
        assert_eq!(states[0], states[1]);
        assert_eq!(states[0]["gameStarted"], false);
    }

    #[test]
    fn disconnect_frees_the_chaser_slot() {
        let mut server = server();
        let _first = connect(&mut server, "player_1");
        let mut watcher = connect(&mut server, "player_2");
        send(&mut server, "player_1", join_chaser(0, "ann"));
        assert_eq!(server.registry().available_chasers(), Vec::<usize>::new());

        server.handle_command(Command::Disconnect {
            player_id: "player_1".to_string(),
        });
        assert_eq!(server.engine().chaser_controller(0), None);
        assert_eq!(server.client_count(), 1);

        let messages = drain_json(&mut watcher);
        let state = messages
            .iter()
            .rev()
            .find(|value| value["type"] == "gameState")
            .expect("state broadcast");
        assert_eq!(state["availableColors"]["chasers"], serde_json::json!([0]));
        assert_eq!(state["players"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn restart_clears_player_catch_stats() {
        let engine = GameEngine::new(
            Maze::parse("#F.C#").expect("layout"),
            GameEngineOptions::default(),
        );
        let mut server = GameServer::new(
            engine,
            GameServerOptions {
                game_code_policy: GameCodePolicy::Label,
                auto_reset_secs: 0,
            },
        );
        let mut rx = connect(&mut server, "player_1");
        send(&mut server, "player_1", join_chaser(0, "abc"));
        send(&mut server, "player_1", ClientMessage::StartGame);
        send(&mut server, "player_1", ClientMessage::Input { dir: crate::types::Direction::Left });
        for _ in 0..(4 * TICK_RATE) {
            if server.engine().phase() == GamePhase::Ended {
                break;
            }
            server.tick();
        }
        assert_eq!(server.engine().phase(), GamePhase::Ended);
        assert_eq!(server.engine().team_score(), 1);
        let before = server.state_message().encode().expect("encodes");
        let before: serde_json::Value = serde_json::from_str(&before).expect("valid json");
        assert_eq!(before["players"][0]["stats"]["catches"], 1);

        send(&mut server, "player_1", ClientMessage::RestartGame);
        let messages = drain_json(&mut rx);
        let state = messages
            .iter()
            .rev()
            .find(|value| value["type"] == "gameState")
            .expect("state broadcast");
        assert_eq!(state["session"]["teamScore"], 0);
        assert_eq!(state["players"][0]["stats"]["catches"], 0);
        assert_eq!(state["players"][0]["type"], "spectator");
    }
}
