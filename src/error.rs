use thiserror::Error;

use crate::types::GamePhase;

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("maze layout is empty")]
    Empty,
    #[error("unknown maze cell {ch:?} at ({x}, {y})")]
    UnknownCell { ch: char, x: usize, y: usize },
    #[error("teleport cells must come in pairs, found {0}")]
    UnpairedTeleports(usize),
    #[error("maze has no {0} spawn cells")]
    MissingSpawns(&'static str),
    #[error("failed to read maze file: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a join or selection is refused. The `Display` text is sent to the
/// requester as the `joinFailed` reason.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("unknown player")]
    UnknownPlayer,
    #[error("only chaser characters can be joined")]
    NotJoinable,
    #[error("character slot {0} does not exist")]
    SlotOutOfRange(i64),
    #[error("character slot {0} is already taken")]
    SlotTaken(usize),
    #[error("character slot {0} is reserved by another player")]
    SlotReserved(usize),
    #[error("game code must be two digits")]
    InvalidGameCode,
    #[error("game code does not match this session")]
    GameCodeMismatch,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("cannot {action} while the game is {phase:?}")]
    InvalidTransition {
        action: &'static str,
        phase: GamePhase,
    },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message must be a json object with a string `type`")]
    MissingType,
    #[error("unknown message type `{0}`")]
    UnknownType(String),
    #[error("field `{0}` is missing or has the wrong type")]
    InvalidField(&'static str),
}

#[derive(Debug, Error)]
pub enum HighscoreError {
    #[error("highscore file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("highscore file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}
