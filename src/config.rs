use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::arena::MatchConfig;
use crate::board::{BoardSize, BoardSizeError};

pub const ENV_BOARD: &str = "CHECKERS_BOARD";
pub const ENV_DEPTH: &str = "CHECKERS_DEPTH";
pub const ENV_ADDR: &str = "CHECKERS_ADDR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error(transparent)]
    BoardSize(#[from] BoardSizeError),
}

/// Launcher settings. Missing JSON fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board_size: BoardSize,
    /// Plies searched by the AI per move.
    pub ai_depth: u32,
    pub bind_addr: String,
    pub match_max_moves: usize,
    pub match_time_per_move_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            board_size: BoardSize::Standard,
            ai_depth: 6,
            bind_addr: "127.0.0.1:3000".to_string(),
            match_max_moves: 200,
            match_time_per_move_ms: 5000,
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults, then the JSON file at `path` if given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_json_str(&json)?
            }
            None => AppConfig::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(board) = lookup(ENV_BOARD) {
            self.board_size = board.parse()?;
        }
        if let Some(depth) = lookup(ENV_DEPTH) {
            self.ai_depth = depth.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_DEPTH,
                value: depth.clone(),
            })?;
        }
        if let Some(addr) = lookup(ENV_ADDR) {
            self.bind_addr = addr;
        }
        Ok(())
    }

    pub fn time_per_move(&self) -> Duration {
        Duration::from_millis(self.match_time_per_move_ms)
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            board_size: self.board_size,
            time_per_move: self.time_per_move(),
            max_moves: self.match_max_moves,
        }
    }
}
