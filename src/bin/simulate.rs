use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use maze_chase_server::constants::{
    CELL_SIZE, DEFAULT_AI_DIFFICULTY, DEFAULT_CHASER_SPEED, DEFAULT_FUGITIVE_SPEED, TICK_MS,
    TICK_RATE,
};
use maze_chase_server::engine::{GameEngine, GameEngineOptions};
use maze_chase_server::maze::Maze;
use maze_chase_server::types::{EngineEvent, EngineSnapshot, GamePhase, GridPos, PixelPos};
use serde::Serialize;

/// Runs whole games headless with AI chasers and prints one JSON line per game.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 10)]
    games: u32,
    #[arg(long, default_value_t = 1)]
    seed: u32,
    #[arg(long, default_value_t = 60)]
    duration_secs: u32,
    #[arg(long, default_value_t = DEFAULT_AI_DIFFICULTY)]
    ai_difficulty: f32,
    #[arg(long, default_value_t = DEFAULT_FUGITIVE_SPEED)]
    fugitive_speed: f32,
    #[arg(long, default_value_t = DEFAULT_CHASER_SPEED)]
    chaser_speed: f32,
    /// Leave chasers idle instead of running the chasing AI.
    #[arg(long)]
    idle_chasers: bool,
    #[arg(long)]
    maze_path: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct GameResultLine {
    game: u32,
    seed: u32,
    score: u32,
    #[serde(rename = "fugitivesCaught")]
    fugitives_caught: u32,
    #[serde(rename = "allCaught")]
    all_caught: bool,
    #[serde(rename = "gameTime")]
    game_time: f64,
    #[serde(rename = "catchTicks")]
    catch_ticks: Vec<u64>,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    games: usize,
    #[serde(rename = "averageScore")]
    average_score: f64,
    #[serde(rename = "allCaughtRate")]
    all_caught_rate: f64,
    #[serde(rename = "catchesByFugitiveCount")]
    catches_histogram: BTreeMap<u32, usize>,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    results: Vec<GameResultLine>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let maze = match &cli.maze_path {
        Some(path) => Maze::load(path),
        None => Maze::builtin(),
    };
    let maze = match maze {
        Ok(maze) => maze,
        Err(error) => {
            tracing::error!(%error, "failed to load maze");
            std::process::exit(2);
        }
    };

    let mut results = Vec::new();
    for game in 0..cli.games {
        let seed = cli.seed.wrapping_add(game);
        let result = run_game(&cli, &maze, game, seed);
        match serde_json::to_string(&result) {
            Ok(line) => println!("{line}"),
            Err(error) => tracing::error!(%error, "failed to serialize game result"),
        }
        results.push(result);
    }

    let summary = build_summary(results);
    tracing::info!(
        games = summary.games,
        average_score = summary.average_score,
        all_caught_rate = summary.all_caught_rate,
        anomalies = summary.anomaly_count,
        "run finished"
    );

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            tracing::error!(path = %path.display(), %error, "failed to write summary");
            std::process::exit(2);
        }
    }
    if summary.anomaly_count > 0 {
        std::process::exit(1);
    }
}

fn run_game(cli: &Cli, maze: &Maze, game: u32, seed: u32) -> GameResultLine {
    let mut engine = GameEngine::new(
        maze.clone(),
        GameEngineOptions {
            seed,
            ai_difficulty: cli.ai_difficulty,
            fugitive_speed: cli.fugitive_speed,
            chaser_speed: cli.chaser_speed,
            duration_seconds: cli.duration_secs,
            chaser_ai: !cli.idle_chasers,
            ..GameEngineOptions::default()
        },
    );

    let mut anomalies = Vec::new();
    if let Err(error) = engine.start(0) {
        anomalies.push(error.to_string());
    }

    let tick_limit = u64::from(engine.config().duration_seconds) * u64::from(TICK_RATE) + 1;
    let mut catch_ticks = Vec::new();
    let mut summary = None;
    while engine.phase() == GamePhase::Running {
        engine.step(TICK_MS);
        let snapshot = engine.build_snapshot();
        for message in collect_snapshot_anomalies(maze, &snapshot) {
            if !anomalies.contains(&message) {
                tracing::warn!(game, tick = snapshot.tick, %message, "anomaly detected");
                anomalies.push(message);
            }
        }
        for event in engine.drain_events() {
            match event {
                EngineEvent::FugitiveCaught { .. } => catch_ticks.push(snapshot.tick),
                EngineEvent::GameEnded(end) => summary = Some(end),
            }
        }
        if snapshot.tick > tick_limit {
            anomalies.push("game outlived its duration".to_string());
            break;
        }
    }

    let summary = summary.unwrap_or_else(|| engine.build_summary());
    GameResultLine {
        game,
        seed,
        score: summary.score,
        fugitives_caught: summary.fugitives_caught,
        all_caught: summary.all_caught,
        game_time: summary.game_time,
        catch_ticks,
        anomalies,
    }
}

fn on_segment(maze: &Maze, grid: GridPos, target: GridPos, pixel: PixelPos) -> bool {
    let a = maze.pixel_center(grid);
    let b = maze.pixel_center(target);
    let cross = (b.x - a.x) * (pixel.y - a.y) - (b.y - a.y) * (pixel.x - a.x);
    let slack = CELL_SIZE * 1e-3;
    cross.abs() <= slack * CELL_SIZE
        && pixel.x >= a.x.min(b.x) - slack
        && pixel.x <= a.x.max(b.x) + slack
        && pixel.y >= a.y.min(b.y) - slack
        && pixel.y <= a.y.max(b.y) + slack
}

fn collect_snapshot_anomalies(maze: &Maze, snapshot: &EngineSnapshot) -> Vec<String> {
    let mut anomalies = Vec::new();
    let fugitives = snapshot
        .positions
        .fugitives
        .iter()
        .filter(|fugitive| !fugitive.caught)
        .map(|fugitive| ("fugitive", fugitive.index, fugitive.grid_pos, fugitive.target_pos, fugitive.pixel_pos));
    let chasers = snapshot
        .positions
        .chasers
        .iter()
        .map(|chaser| ("chaser", chaser.index, chaser.grid_pos, chaser.target_pos, chaser.pixel_pos));

    for (kind, index, grid, target, pixel) in fugitives.chain(chasers) {
        if !maze.is_walkable(target.x, target.y) {
            anomalies.push(format!("{kind} {index} targets a wall"));
        }
        if (grid.x - target.x).abs() + (grid.y - target.y).abs() > 1 {
            anomalies.push(format!("{kind} {index} targets a non-adjacent cell"));
        }
        if !on_segment(maze, grid, target, pixel) {
            anomalies.push(format!("{kind} {index} left its movement segment"));
        }
    }
    anomalies
}

fn build_summary(results: Vec<GameResultLine>) -> RunSummary {
    let games = results.len();
    let denominator = games.max(1) as f64;
    let mut catches_histogram = BTreeMap::new();
    for result in &results {
        *catches_histogram.entry(result.fugitives_caught).or_insert(0) += 1;
    }
    RunSummary {
        games,
        average_score: results.iter().map(|r| f64::from(r.score)).sum::<f64>() / denominator,
        all_caught_rate: results.iter().filter(|r| r.all_caught).count() as f64 / denominator,
        catches_histogram,
        anomaly_count: results.iter().map(|r| r.anomalies.len()).sum(),
        results,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let text = serde_json::to_string_pretty(summary).map_err(std::io::Error::other)?;
    fs::write(path, text)
}
