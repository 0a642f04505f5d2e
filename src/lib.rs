pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod game_server;
pub mod highscore_store;
pub mod maze;
pub mod registry;
pub mod rng;
pub mod server_protocol;
pub mod server_utils;
pub mod types;
