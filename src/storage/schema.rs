//! Database schema and connection management

use crate::error::RinkError;
use anyhow::Result;
use dirs::cache_dir;
use rusqlite::Connection;
use std::path::PathBuf;

/// Database connection manager for processed game data
pub struct GameDatabase {
    pub(crate) conn: Connection,
}

impl GameDatabase {
    /// Create a new database connection and ensure tables exist
    pub fn new() -> Result<Self> {
        let db_path = Self::database_path()?;

        // Ensure the cache directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Get the path to the database file
    fn database_path() -> Result<PathBuf> {
        let cache_dir = cache_dir().ok_or_else(|| RinkError::Storage {
            message: "Could not determine cache directory".to_string(),
        })?;
        Ok(cache_dir.join("rinkstats").join("games.db"))
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS games (
                game_id INTEGER PRIMARY KEY,
                season INTEGER NOT NULL,
                session TEXT NOT NULL,
                payload TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS skipped_games (
                game_id INTEGER PRIMARY KEY,
                reason TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_games_season ON games (season)",
            [],
        )?;

        Ok(())
    }
}
