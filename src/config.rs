use std::path::PathBuf;

use clap::Parser;

use crate::constants::{
    DEFAULT_AI_DIFFICULTY, DEFAULT_AUTO_RESET_SECS, DEFAULT_CHASER_SPEED,
    DEFAULT_DURATION_SECONDS, DEFAULT_FUGITIVE_SPEED,
};
use crate::engine::GameEngineOptions;
use crate::error::MazeError;
use crate::game_server::GameServerOptions;
use crate::maze::Maze;
use crate::server_utils::{make_game_code, normalize_game_code, GameCodePolicy};

#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "Authoritative maze chase game server")]
pub struct ServerConfig {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
    /// ASCII maze layout; the built-in maze is used when absent.
    #[arg(long, env = "MAZE_PATH")]
    pub maze_path: Option<PathBuf>,
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
    #[arg(long, env = "HIGHSCORE_DB_PATH", default_value = ".data/highscore.json")]
    pub highscore_path: PathBuf,
    /// Two-digit session code; random when absent.
    #[arg(long, env = "GAME_CODE")]
    pub game_code: Option<String>,
    #[arg(long, env = "GAME_CODE_POLICY", value_enum, default_value_t = GameCodePolicy::Label)]
    pub game_code_policy: GameCodePolicy,
    #[arg(long, env = "DURATION_SECS", default_value_t = DEFAULT_DURATION_SECONDS)]
    pub duration_secs: u32,
    #[arg(long, env = "AI_DIFFICULTY", default_value_t = DEFAULT_AI_DIFFICULTY)]
    pub ai_difficulty: f32,
    #[arg(long, env = "FUGITIVE_SPEED", default_value_t = DEFAULT_FUGITIVE_SPEED)]
    pub fugitive_speed: f32,
    #[arg(long, env = "CHASER_SPEED", default_value_t = DEFAULT_CHASER_SPEED)]
    pub chaser_speed: f32,
    /// Leave unclaimed chasers on their spawns instead of hunting.
    #[arg(long, env = "IDLE_CHASERS")]
    pub idle_chasers: bool,
    /// Seconds before a finished game resets itself; 0 disables.
    #[arg(long, env = "AUTO_RESET_SECS", default_value_t = DEFAULT_AUTO_RESET_SECS)]
    pub auto_reset_secs: u64,
    /// AI random seed; random when absent.
    #[arg(long, env = "SEED")]
    pub seed: Option<u32>,
}

impl ServerConfig {
    pub fn load_maze(&self) -> Result<Maze, MazeError> {
        match &self.maze_path {
            Some(path) => Maze::load(path),
            None => Maze::builtin(),
        }
    }

    /// The configured code when it is valid, otherwise a fresh random one.
    pub fn resolve_game_code(&self) -> String {
        match self.game_code.as_deref() {
            Some(raw) => normalize_game_code(raw).unwrap_or_else(|| {
                tracing::warn!(game_code = raw, "invalid game code, generating one");
                make_game_code()
            }),
            None => make_game_code(),
        }
    }

    pub fn engine_options(&self) -> GameEngineOptions {
        GameEngineOptions {
            seed: self.seed.unwrap_or_else(rand::random),
            game_code: self.resolve_game_code(),
            ai_difficulty: self.ai_difficulty,
            fugitive_speed: self.fugitive_speed,
            chaser_speed: self.chaser_speed,
            duration_seconds: self.duration_secs,
            chaser_ai: !self.idle_chasers,
        }
    }

    pub fn server_options(&self) -> GameServerOptions {
        GameServerOptions {
            game_code_policy: self.game_code_policy,
            auto_reset_secs: self.auto_reset_secs,
        }
    }

    /// Explicit directory when it exists, otherwise the first conventional
    /// client build directory holding an `index.html`.
    pub fn resolve_static_dir(&self) -> Option<PathBuf> {
        if let Some(path) = &self.static_dir {
            if path.is_dir() {
                return Some(path.clone());
            }
            tracing::warn!(path = %path.display(), "static dir not found");
        }
        [PathBuf::from("public"), PathBuf::from("dist/client")]
            .into_iter()
            .find(|path| path.join("index.html").is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["server"];
        argv.extend_from_slice(args);
        ServerConfig::try_parse_from(argv).expect("arguments parse")
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--port",
            "9000",
            "--game-code",
            "7",
            "--game-code-policy",
            "strict",
            "--idle-chasers",
            "--seed",
            "12",
            "--duration-secs",
            "60",
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.game_code_policy, GameCodePolicy::Strict);
        assert!(config.idle_chasers);

        let options = config.engine_options();
        assert_eq!(options.game_code, "07");
        assert_eq!(options.seed, 12);
        assert_eq!(options.duration_seconds, 60);
        assert!(!options.chaser_ai);
    }

    #[test]
    fn invalid_game_code_falls_back_to_a_generated_one() {
        let config = parse(&["--game-code", "abc"]);
        let code = config.resolve_game_code();
        assert_eq!(code.len(), 2);
        assert!(code.chars().all(|ch| ch.is_ascii_digit()));
    }

    #[test]
    fn builtin_maze_is_used_without_a_path() {
        let config = parse(&[]);
        let maze = config.load_maze().expect("builtin maze");
        assert_eq!(maze.chaser_spawns().len(), 4);
        assert_eq!(config.server_options().auto_reset_secs, DEFAULT_AUTO_RESET_SECS);
        assert!(config.engine_options().chaser_ai);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let argv = ["server", "--game-code-policy", "loose"];
        assert!(ServerConfig::try_parse_from(argv).is_err());
    }
}
