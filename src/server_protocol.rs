use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ProtocolError;
use crate::registry::{ChaserSelection, JoinRequest, PlayerView};
use crate::types::{
    CharacterType, ConfigUpdate, Direction, GameConfig, GameEndSummary, PositionsView,
    SessionView,
};

#[derive(Clone, Debug, PartialEq)]
pub enum ClientMessage {
    GameState,
    Join(JoinRequest),
    Input { dir: Direction },
    StartGame,
    EndGame,
    RestartGame,
    SetAiDifficulty { difficulty: f32 },
    SetSpeeds {
        fugitive_speed: Option<f32>,
        chaser_speed: Option<f32>,
    },
    SetGameDuration { duration_seconds: i64 },
    SelectChaser {
        color_index: i64,
        player_name: String,
    },
    CancelSelection,
}

impl ClientMessage {
    /// The config change carried by an admin message.
    pub fn config_update(&self) -> Option<ConfigUpdate> {
        match *self {
            ClientMessage::SetAiDifficulty { difficulty } => Some(ConfigUpdate {
                ai_difficulty: Some(difficulty),
                ..ConfigUpdate::default()
            }),
            ClientMessage::SetSpeeds {
                fugitive_speed,
                chaser_speed,
            } => Some(ConfigUpdate {
                fugitive_speed,
                chaser_speed,
                ..ConfigUpdate::default()
            }),
            ClientMessage::SetGameDuration { duration_seconds } => Some(ConfigUpdate {
                duration_seconds: Some(duration_seconds),
                ..ConfigUpdate::default()
            }),
            _ => None,
        }
    }
}

pub fn parse_client_message(raw: &str) -> Result<ClientMessage, ProtocolError> {
    let value: Value = serde_json::from_str(raw)?;
    let object = value.as_object().ok_or(ProtocolError::MissingType)?;
    let message_type = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingType)?;

    match message_type {
        "gameState" => Ok(ClientMessage::GameState),
        "join" => {
            let character_type = match object.get("characterType") {
                None | Some(Value::Null) => None,
                Some(value) => value.as_str().and_then(CharacterType::parse),
            };
            let color_index = required(parse_optional_i64(object, "colorIndex")?, "colorIndex")?;
            Ok(ClientMessage::Join(JoinRequest {
                character_type,
                color_index,
                player_name: parse_optional_string(object, "playerName")?.unwrap_or_default(),
                game_code: parse_game_code(object.get("gameCode"))?,
            }))
        }
        "input" => {
            let raw_dir = object
                .get("input")
                .and_then(Value::as_object)
                .and_then(|input| input.get("dir"))
                .or_else(|| object.get("dir"));
            let dir = raw_dir
                .and_then(Value::as_str)
                .and_then(Direction::parse)
                .ok_or(ProtocolError::InvalidField("dir"))?;
            Ok(ClientMessage::Input { dir })
        }
        "startGame" => Ok(ClientMessage::StartGame),
        "endGame" => Ok(ClientMessage::EndGame),
        "restartGame" => Ok(ClientMessage::RestartGame),
        "setAIDifficulty" => {
            let difficulty = required(parse_optional_f32(object, "difficulty")?, "difficulty")?;
            Ok(ClientMessage::SetAiDifficulty { difficulty })
        }
        "setSpeeds" => {
            let fugitive_speed = parse_optional_f32(object, "fugitiveSpeed")?;
            let chaser_speed = parse_optional_f32(object, "chaserSpeed")?;
            if fugitive_speed.is_none() && chaser_speed.is_none() {
                return Err(ProtocolError::InvalidField("fugitiveSpeed"));
            }
            Ok(ClientMessage::SetSpeeds {
                fugitive_speed,
                chaser_speed,
            })
        }
        "setGameDuration" => {
            let duration_seconds = required(parse_optional_i64(object, "duration")?, "duration")?;
            Ok(ClientMessage::SetGameDuration { duration_seconds })
        }
        "selectChaser" => {
            let color_index = required(parse_optional_i64(object, "colorIndex")?, "colorIndex")?;
            Ok(ClientMessage::SelectChaser {
                color_index,
                player_name: parse_optional_string(object, "playerName")?.unwrap_or_default(),
            })
        }
        "cancelSelection" => Ok(ClientMessage::CancelSelection),
        other => Err(ProtocolError::UnknownType(other.to_string())),
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ProtocolError> {
    value.ok_or(ProtocolError::InvalidField(field))
}

fn parse_optional_string(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ProtocolError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ProtocolError::InvalidField(field)),
    }
}

/// Accepts a JSON number or a numeric string.
fn parse_optional_f64(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, ProtocolError> {
    let number = match object.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match number {
        Some(number) if number.is_finite() => Ok(Some(number)),
        _ => Err(ProtocolError::InvalidField(field)),
    }
}

fn parse_optional_f32(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f32>, ProtocolError> {
    Ok(parse_optional_f64(object, field)?.map(|number| number as f32))
}

/// Integers are floored; values beyond the exactly representable range are
/// rejected.
fn parse_optional_i64(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<i64>, ProtocolError> {
    const MAX_SAFE_INTEGER_F64: f64 = 9_007_199_254_740_991.0;

    if let Some(number) = object.get(field).and_then(Value::as_i64) {
        return Ok(Some(number));
    }
    let Some(number) = parse_optional_f64(object, field)? else {
        return Ok(None);
    };
    let floored = number.floor();
    if floored.abs() > MAX_SAFE_INTEGER_F64 {
        return Err(ProtocolError::InvalidField(field));
    }
    Ok(Some(floored as i64))
}

fn parse_game_code(value: Option<&Value>) -> Result<String, ProtocolError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(code)) => Ok(code.clone()),
        Some(Value::Number(number)) => number
            .as_u64()
            .map(|code| code.to_string())
            .ok_or(ProtocolError::InvalidField("gameCode")),
        Some(_) => Err(ProtocolError::InvalidField("gameCode")),
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AvailableColors {
    pub chasers: Vec<usize>,
    pub fugitives: Vec<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MazeView {
    pub width: i32,
    pub height: i32,
    #[serde(rename = "cellSize")]
    pub cell_size: f32,
    pub tiles: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameStatePayload {
    pub tick: u64,
    pub players: Vec<PlayerView>,
    #[serde(rename = "chaserSelections")]
    pub chaser_selections: BTreeMap<usize, ChaserSelection>,
    #[serde(rename = "availableColors")]
    pub available_colors: AvailableColors,
    #[serde(rename = "gameStarted")]
    pub game_started: bool,
    pub session: SessionView,
    pub positions: PositionsView,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Connected {
        #[serde(rename = "playerId")]
        player_id: String,
        maze: MazeView,
    },
    GameState(GameStatePayload),
    Joined {
        #[serde(rename = "colorIndex")]
        color_index: usize,
        #[serde(rename = "playerName")]
        player_name: String,
    },
    JoinFailed {
        reason: String,
    },
    SelectionFailed {
        reason: String,
    },
    GameStarted {
        #[serde(rename = "startTimestamp")]
        start_timestamp: Option<u64>,
    },
    GameEnd(GameEndSummary),
    GameReset,
    GameRestarted,
    Caught {
        #[serde(rename = "fugitiveIndex")]
        fugitive_index: usize,
        #[serde(rename = "chaserIndices")]
        chaser_indices: Vec<usize>,
        #[serde(rename = "teamScore")]
        team_score: u32,
    },
    ConfigUpdated {
        config: GameConfig,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
