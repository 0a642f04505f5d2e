use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Fixed evaluation order; ties in AI scoring resolve to the earliest entry.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterType {
    Chaser,
    Fugitive,
}

impl CharacterType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chaser" => Some(Self::Chaser),
            "fugitive" => Some(Self::Fugitive),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Idle,
    Running,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PixelPos {
    pub x: f32,
    pub y: f32,
}

impl PixelPos {
    pub fn distance_to(self, other: PixelPos) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct GameConfig {
    #[serde(rename = "tickRate")]
    pub tick_rate: u32,
    #[serde(rename = "aiDifficulty")]
    pub ai_difficulty: f32,
    #[serde(rename = "fugitiveSpeed")]
    pub fugitive_speed: f32,
    #[serde(rename = "chaserSpeed")]
    pub chaser_speed: f32,
    #[serde(rename = "durationSeconds")]
    pub duration_seconds: u32,
    #[serde(rename = "chaserAi")]
    pub chaser_ai: bool,
}

/// Partial admin update; `None` fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigUpdate {
    pub ai_difficulty: Option<f32>,
    pub fugitive_speed: Option<f32>,
    pub chaser_speed: Option<f32>,
    pub duration_seconds: Option<i64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FugitiveView {
    pub index: usize,
    #[serde(rename = "gridPos")]
    pub grid_pos: GridPos,
    #[serde(rename = "pixelPos")]
    pub pixel_pos: PixelPos,
    #[serde(rename = "targetPos")]
    pub target_pos: GridPos,
    pub caught: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChaserView {
    pub index: usize,
    #[serde(rename = "gridPos")]
    pub grid_pos: GridPos,
    #[serde(rename = "pixelPos")]
    pub pixel_pos: PixelPos,
    #[serde(rename = "targetPos")]
    pub target_pos: GridPos,
    #[serde(rename = "isPlayerControlled")]
    pub is_player_controlled: bool,
    #[serde(rename = "playerId")]
    pub player_id: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PositionsView {
    pub fugitives: Vec<FugitiveView>,
    pub chasers: Vec<ChaserView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub phase: GamePhase,
    #[serde(rename = "startTimestamp")]
    pub start_timestamp: Option<u64>,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    #[serde(rename = "timeLeftMs")]
    pub time_left_ms: u64,
    #[serde(rename = "teamScore")]
    pub team_score: u32,
    #[serde(rename = "catchCount")]
    pub catch_count: u32,
    #[serde(rename = "totalFugitives")]
    pub total_fugitives: usize,
    /// Difficulty actually used by the fugitive AI; pinned to 1.0 while a
    /// single fugitive remains.
    #[serde(rename = "effectiveAiDifficulty")]
    pub effective_ai_difficulty: f32,
    pub config: GameConfig,
}

#[derive(Clone, Debug, Serialize)]
pub struct EngineSnapshot {
    pub tick: u64,
    pub session: SessionView,
    pub positions: PositionsView,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameEndSummary {
    pub score: u32,
    #[serde(rename = "gameTime")]
    pub game_time: f64,
    #[serde(rename = "fugitivesCaught")]
    pub fugitives_caught: u32,
    #[serde(rename = "totalFugitives")]
    pub total_fugitives: usize,
    #[serde(rename = "allCaught")]
    pub all_caught: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    FugitiveCaught {
        fugitive_index: usize,
        chaser_indices: Vec<usize>,
        team_score: u32,
    },
    GameEnded(GameEndSummary),
}
