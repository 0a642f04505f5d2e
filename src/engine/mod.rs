use std::collections::VecDeque;

use crate::constants::{
    clamp_ai_difficulty, clamp_duration_seconds, clamp_speed, CHARACTER_SLOTS,
    DEFAULT_AI_DIFFICULTY, DEFAULT_CHASER_SPEED, DEFAULT_DURATION_SECONDS,
    DEFAULT_FUGITIVE_SPEED, HISTORY_LEN, TICK_RATE,
};
use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{
    ChaserView, ConfigUpdate, Direction, EngineEvent, EngineSnapshot, FugitiveView, GameConfig,
    GamePhase, GridPos, PixelPos, PositionsView, SessionView,
};

mod fugitive_ai;
mod lifecycle;
mod movement;

#[derive(Clone, Debug)]
struct Character {
    spawn: GridPos,
    grid_pos: GridPos,
    target_pos: GridPos,
    pixel_pos: PixelPos,
    last_direction: Option<Direction>,
    history: VecDeque<GridPos>,
}

impl Character {
    fn at_spawn(spawn: GridPos, maze: &Maze) -> Self {
        Self {
            spawn,
            grid_pos: spawn,
            target_pos: spawn,
            pixel_pos: maze.pixel_center(spawn),
            last_direction: None,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    fn reset(&mut self, maze: &Maze) {
        *self = Self::at_spawn(self.spawn, maze);
    }

    fn is_moving(&self) -> bool {
        self.grid_pos != self.target_pos
    }

    /// Places the character at rest on `pos` in one step (teleports, tunnel).
    fn relocate(&mut self, pos: GridPos, maze: &Maze) {
        self.grid_pos = pos;
        self.target_pos = pos;
        self.pixel_pos = maze.pixel_center(pos);
    }

    fn remember(&mut self, pos: GridPos) {
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(pos);
    }

    /// The `window` most recent history entries, newest first.
    fn recent(&self, window: usize) -> impl Iterator<Item = &GridPos> {
        self.history.iter().rev().take(window)
    }
}

#[derive(Clone, Debug)]
struct FugitiveInternal {
    character: Character,
    caught: bool,
}

#[derive(Clone, Debug)]
struct ChaserInternal {
    character: Character,
    controlling_player_id: Option<String>,
    pending_direction: Option<Direction>,
}

#[derive(Clone, Debug)]
pub struct GameEngineOptions {
    pub seed: u32,
    pub game_code: String,
    pub ai_difficulty: f32,
    pub fugitive_speed: f32,
    pub chaser_speed: f32,
    pub duration_seconds: u32,
    pub chaser_ai: bool,
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            game_code: "00".to_string(),
            ai_difficulty: DEFAULT_AI_DIFFICULTY,
            fugitive_speed: DEFAULT_FUGITIVE_SPEED,
            chaser_speed: DEFAULT_CHASER_SPEED,
            duration_seconds: DEFAULT_DURATION_SECONDS,
            chaser_ai: false,
        }
    }
}

/// Canonical game state. Owned by exactly one task; every mutation goes
/// through `&mut self`.
#[derive(Clone, Debug)]
pub struct GameEngine {
    maze: Maze,
    config: GameConfig,
    game_code: String,
    rng: Rng,
    fugitives: Vec<FugitiveInternal>,
    chasers: Vec<ChaserInternal>,

    phase: GamePhase,
    start_timestamp: Option<u64>,
    elapsed_ms: u64,
    team_score: u32,
    catch_count: u32,
    tick_counter: u64,
    ended_at_tick: Option<u64>,
    events: Vec<EngineEvent>,
}

impl GameEngine {
    pub fn new(maze: Maze, options: GameEngineOptions) -> Self {
        let fugitives = maze
            .fugitive_spawns()
            .iter()
            .take(CHARACTER_SLOTS)
            .map(|&spawn| FugitiveInternal {
                character: Character::at_spawn(spawn, &maze),
                caught: false,
            })
            .collect();
        let chasers = maze
            .chaser_spawns()
            .iter()
            .take(CHARACTER_SLOTS)
            .map(|&spawn| ChaserInternal {
                character: Character::at_spawn(spawn, &maze),
                controlling_player_id: None,
                pending_direction: None,
            })
            .collect();

        let config = GameConfig {
            tick_rate: TICK_RATE,
            ai_difficulty: clamp_ai_difficulty(options.ai_difficulty),
            fugitive_speed: clamp_speed(options.fugitive_speed),
            chaser_speed: clamp_speed(options.chaser_speed),
            duration_seconds: clamp_duration_seconds(options.duration_seconds as i64),
            chaser_ai: options.chaser_ai,
        };

        Self {
            maze,
            config,
            game_code: options.game_code,
            rng: Rng::new(options.seed),
            fugitives,
            chasers,
            phase: GamePhase::Idle,
            start_timestamp: None,
            elapsed_ms: 0,
            team_score: 0,
            catch_count: 0,
            tick_counter: 0,
            ended_at_tick: None,
            events: Vec::new(),
        }
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn game_code(&self) -> &str {
        &self.game_code
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn team_score(&self) -> u32 {
        self.team_score
    }

    pub fn chaser_count(&self) -> usize {
        self.chasers.len()
    }

    pub fn fugitive_count(&self) -> usize {
        self.fugitives.len()
    }

    pub fn uncaught_count(&self) -> usize {
        self.fugitives.iter().filter(|fugitive| !fugitive.caught).count()
    }

    pub fn effective_ai_difficulty(&self) -> f32 {
        if self.uncaught_count() == 1 {
            return 1.0;
        }
        self.config.ai_difficulty
    }

    /// Advances the simulation by one tick. Movement runs before catch
    /// detection, which runs before the end-of-game check.
    pub fn step(&mut self, dt_ms: u64) {
        self.tick_counter += 1;
        if self.phase != GamePhase::Running {
            return;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        self.advance_characters();
        self.resolve_catches();
        self.check_game_end();
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn apply_config(&mut self, update: &ConfigUpdate) -> &GameConfig {
        if let Some(value) = update.ai_difficulty {
            self.config.ai_difficulty = clamp_ai_difficulty(value);
        }
        if let Some(value) = update.fugitive_speed {
            self.config.fugitive_speed = clamp_speed(value);
        }
        if let Some(value) = update.chaser_speed {
            self.config.chaser_speed = clamp_speed(value);
        }
        if let Some(value) = update.duration_seconds {
            self.config.duration_seconds = clamp_duration_seconds(value);
        }
        &self.config
    }

    /// Puts every character back on its spawn cell and clears catches,
    /// scores and chaser control. The phase is left untouched.
    pub fn reset_to_spawns(&mut self) {
        for fugitive in &mut self.fugitives {
            fugitive.character.reset(&self.maze);
            fugitive.caught = false;
        }
        for chaser in &mut self.chasers {
            chaser.character.reset(&self.maze);
            chaser.controlling_player_id = None;
            chaser.pending_direction = None;
        }
        self.team_score = 0;
        self.catch_count = 0;
        self.elapsed_ms = 0;
    }

    pub fn assign_chaser(&mut self, color_index: usize, player_id: &str) -> bool {
        let Some(chaser) = self.chasers.get_mut(color_index) else {
            return false;
        };
        chaser.controlling_player_id = Some(player_id.to_string());
        chaser.pending_direction = None;
        true
    }

    pub fn release_chaser(&mut self, color_index: usize) {
        if let Some(chaser) = self.chasers.get_mut(color_index) {
            chaser.controlling_player_id = None;
            chaser.pending_direction = None;
        }
    }

    pub fn chaser_controller(&self, color_index: usize) -> Option<&str> {
        self.chasers
            .get(color_index)
            .and_then(|chaser| chaser.controlling_player_id.as_deref())
    }

    /// Buffers a direction for a player-controlled chaser. It is consumed by
    /// the next tick that can honour it.
    pub fn set_chaser_input(&mut self, color_index: usize, dir: Direction) -> bool {
        let Some(chaser) = self.chasers.get_mut(color_index) else {
            return false;
        };
        if chaser.controlling_player_id.is_none() {
            return false;
        }
        chaser.pending_direction = Some(dir);
        true
    }

    pub fn build_snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            tick: self.tick_counter,
            session: SessionView {
                phase: self.phase,
                start_timestamp: self.start_timestamp,
                elapsed_ms: self.elapsed_ms,
                time_left_ms: self.time_left_ms(),
                team_score: self.team_score,
                catch_count: self.catch_count,
                total_fugitives: self.fugitives.len(),
                effective_ai_difficulty: self.effective_ai_difficulty(),
                config: self.config.clone(),
            },
            positions: PositionsView {
                fugitives: self
                    .fugitives
                    .iter()
                    .enumerate()
                    .map(|(index, fugitive)| FugitiveView {
                        index,
                        grid_pos: fugitive.character.grid_pos,
                        pixel_pos: fugitive.character.pixel_pos,
                        target_pos: fugitive.character.target_pos,
                        caught: fugitive.caught,
                    })
                    .collect(),
                chasers: self
                    .chasers
                    .iter()
                    .enumerate()
                    .map(|(index, chaser)| ChaserView {
                        index,
                        grid_pos: chaser.character.grid_pos,
                        pixel_pos: chaser.character.pixel_pos,
                        target_pos: chaser.character.target_pos,
                        is_player_controlled: chaser.controlling_player_id.is_some(),
                        player_id: chaser.controlling_player_id.clone(),
                    })
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::{MAX_SPEED, MIN_DURATION_SECONDS, TICK_MS};
    use crate::engine::{GameEngine, GameEngineOptions};
    use crate::maze::Maze;
    use crate::types::{ConfigUpdate, Direction, GamePhase, GridPos};

    pub(super) fn engine_for(layout: &str) -> GameEngine {
        GameEngine::new(
            Maze::parse(layout).expect("test layout parses"),
            GameEngineOptions::default(),
        )
    }

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn new_engine_places_characters_on_spawns() {
        let engine = GameEngine::new(
            Maze::builtin().expect("builtin maze"),
            GameEngineOptions::default(),
        );
        let snapshot = engine.build_snapshot();
        assert_eq!(snapshot.session.phase, GamePhase::Idle);
        assert_eq!(snapshot.positions.fugitives.len(), 4);
        assert_eq!(snapshot.positions.chasers.len(), 4);
        for (view, spawn) in snapshot
            .positions
            .fugitives
            .iter()
            .zip(engine.maze().fugitive_spawns())
        {
            assert_eq!(view.grid_pos, *spawn);
            assert_eq!(view.target_pos, *spawn);
            assert!(!view.caught);
        }
    }

    #[test]
    fn idle_engine_does_not_move() {
        let mut engine = engine_for("#F...C#");
        let before = engine.build_snapshot();
        for _ in 0..10 {
            engine.step(TICK_MS);
        }
        let after = engine.build_snapshot();
        assert_eq!(after.tick, 10);
        assert_eq!(
            before.positions.fugitives[0].grid_pos,
            after.positions.fugitives[0].grid_pos
        );
        assert_eq!(after.session.elapsed_ms, 0);
    }

    #[test]
    fn apply_config_merges_and_clamps() {
        let mut engine = engine_for("#F...C#");
        let original_chaser_speed = engine.config().chaser_speed;
        engine.apply_config(&ConfigUpdate {
            ai_difficulty: Some(3.0),
            fugitive_speed: Some(99.0),
            chaser_speed: None,
            duration_seconds: Some(0),
        });
        let config = engine.config();
        assert!(approx_eq(config.ai_difficulty, 1.0, 1e-6));
        assert!(approx_eq(config.fugitive_speed, MAX_SPEED, 1e-6));
        assert!(approx_eq(config.chaser_speed, original_chaser_speed, 1e-6));
        assert_eq!(config.duration_seconds, MIN_DURATION_SECONDS);
    }

    #[test]
    fn reset_to_spawns_restores_everything() {
        let mut engine = engine_for("#F.....C#");
        engine.assign_chaser(0, "player_1");
        engine.start(0).expect("start from idle");
        for _ in 0..12 {
            engine.step(TICK_MS);
        }
        engine.fugitives[0].caught = true;
        engine.team_score = 3;

        engine.reset_to_spawns();
        let snapshot = engine.build_snapshot();
        assert_eq!(snapshot.positions.fugitives[0].grid_pos, GridPos::new(1, 0));
        assert!(!snapshot.positions.fugitives[0].caught);
        assert_eq!(snapshot.positions.chasers[0].grid_pos, GridPos::new(7, 0));
        assert!(!snapshot.positions.chasers[0].is_player_controlled);
        assert_eq!(snapshot.session.team_score, 0);
        assert_eq!(snapshot.session.catch_count, 0);
        assert!(engine.fugitives[0].character.history.is_empty());
    }

    #[test]
    fn chaser_input_requires_a_controller() {
        let mut engine = engine_for("#F...C#");
        assert!(!engine.set_chaser_input(0, Direction::Left));
        assert!(engine.assign_chaser(0, "player_1"));
        assert!(engine.set_chaser_input(0, Direction::Left));
        assert!(!engine.set_chaser_input(4, Direction::Left));
        engine.release_chaser(0);
        assert_eq!(engine.chaser_controller(0), None);
        assert_eq!(engine.chasers[0].pending_direction, None);
    }

    #[test]
    fn single_remaining_fugitive_forces_full_difficulty() {
        let mut engine = engine_for("#F.F...C#");
        engine.apply_config(&ConfigUpdate {
            ai_difficulty: Some(0.2),
            ..ConfigUpdate::default()
        });
        assert!(approx_eq(engine.effective_ai_difficulty(), 0.2, 1e-6));
        engine.fugitives[0].caught = true;
        assert!(approx_eq(engine.effective_ai_difficulty(), 1.0, 1e-6));
        engine.apply_config(&ConfigUpdate {
            ai_difficulty: Some(0.0),
            ..ConfigUpdate::default()
        });
        assert!(approx_eq(engine.effective_ai_difficulty(), 1.0, 1e-6));
        engine.reset_to_spawns();
        assert!(approx_eq(engine.effective_ai_difficulty(), 0.0, 1e-6));
    }

    #[test]
    fn history_is_a_bounded_ring() {
        let mut engine = engine_for("#F...C#");
        let character = &mut engine.fugitives[0].character;
        for x in 0..10 {
            character.remember(GridPos::new(x, 0));
        }
        assert_eq!(character.history.len(), crate::constants::HISTORY_LEN);
        let newest: Vec<i32> = character.recent(2).map(|pos| pos.x).collect();
        assert_eq!(newest, vec![9, 8]);
    }
}
