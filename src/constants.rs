pub const TICK_RATE: u32 = 20;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

/// Number of character slots per pool. Spawn cells beyond this are ignored.
pub const CHARACTER_SLOTS: usize = 4;

pub const CELL_SIZE: f32 = 20.0;
/// Fraction of a cell covered per tick at speed multiplier 1.0.
pub const BASE_STEP_FRACTION: f32 = 0.25;
pub const ARRIVAL_EPSILON: f32 = 1e-3;

pub const HISTORY_LEN: usize = 6;
pub const HISTORY_EXCLUSION_WINDOW: usize = 4;
pub const HISTORY_PENALTY_WINDOW: usize = 2;

pub const CONTINUATION_BONUS: f32 = 0.5;
pub const REVISIT_PENALTY: f32 = 2.0;
pub const PROGRESS_BONUS: f32 = 1.0;

pub const DEFAULT_DURATION_SECONDS: u32 = 120;
pub const MIN_DURATION_SECONDS: u32 = 1;
pub const MAX_DURATION_SECONDS: u32 = 3_600;

pub const DEFAULT_AI_DIFFICULTY: f32 = 0.7;
pub const DEFAULT_FUGITIVE_SPEED: f32 = 0.9;
pub const DEFAULT_CHASER_SPEED: f32 = 1.0;
pub const MIN_SPEED: f32 = 0.1;
pub const MAX_SPEED: f32 = 3.0;

pub const DEFAULT_AUTO_RESET_SECS: u64 = 30;

pub const CLIENT_QUEUE_CAPACITY: usize = 256;
pub const COMMAND_QUEUE_CAPACITY: usize = 1_024;

pub const PLAYER_NAME_MAX_LEN: usize = 3;
pub const GAME_CODE_LEN: usize = 2;

/// Built-in maze. `#` and space are walls, `.` path, `T` teleport,
/// `C` chaser spawn, `F` fugitive spawn. Row 9 is the tunnel row.
pub const DEFAULT_MAZE_LAYOUT: &str = "\
#####################
#F........#........F#
#.###.###.#.###.###.#
#T..................#
#.###.#.#####.#.###.#
#.....#...#...#.....#
#####.###.#.###.#####
    #.#.......#.#
#####.#.##.##.#.#####
.......#CC.CC#.......
#####.#.#####.#.#####
    #.#.......#.#
#####.#.#####.#.#####
#.........#.........#
#.###.###.#.###.###.#
#...#...........#..T#
###.#.#.#####.#.#.###
#.....#...#...#.....#
#.#######.#.#######.#
#F.................F#
#####################";

pub fn clamp_speed(value: f32) -> f32 {
    if !value.is_finite() {
        return DEFAULT_CHASER_SPEED;
    }
    value.clamp(MIN_SPEED, MAX_SPEED)
}

pub fn clamp_ai_difficulty(value: f32) -> f32 {
    if !value.is_finite() {
        return DEFAULT_AI_DIFFICULTY;
    }
    value.clamp(0.0, 1.0)
}

pub fn clamp_duration_seconds(value: i64) -> u32 {
    value.clamp(MIN_DURATION_SECONDS as i64, MAX_DURATION_SECONDS as i64) as u32
}

pub fn step_distance(speed_multiplier: f32) -> f32 {
    speed_multiplier * CELL_SIZE * BASE_STEP_FRACTION
}
