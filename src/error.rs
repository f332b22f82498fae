//! Error types for the rinkstats engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RinkError>;

#[derive(Error, Debug)]
pub enum RinkError {
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse game ID: {0}")]
    InvalidGameId(#[from] std::num::ParseIntError),

    #[error("Game {game_id} is not a valid NHL game id: {reason}")]
    MalformedGameId { game_id: u64, reason: String },

    #[error("Game {game_id} skipped: {reason}")]
    GameSkipped { game_id: u64, reason: String },

    #[error("Schema contract violated for column '{column}': {message}")]
    Contract { column: String, message: String },

    #[error("Invalid aggregation request: {message}")]
    Config { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Source table error: {message}")]
    Source { message: String },

    #[error("No event rows for game {game_id}")]
    NoEvents { game_id: u64 },
}

impl From<Box<dyn std::error::Error + Send + Sync>> for RinkError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        RinkError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for RinkError {
    fn from(err: rusqlite::Error) -> Self {
        RinkError::Storage {
            message: err.to_string(),
        }
    }
}
