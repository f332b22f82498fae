//! Basic database query operations

use super::schema::GameDatabase;
use crate::batch::{EnrichedGame, SkippedGame};
use crate::cli::types::GameId;
use anyhow::Result;
use rusqlite::{params, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};

impl GameDatabase {
    /// Insert or replace a processed game, keeping the original insertion
    /// time. A successful process clears any standing skip record.
    pub fn upsert_game(&mut self, game: &EnrichedGame) -> Result<()> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let payload = serde_json::to_string(game)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO games (game_id, season, session, payload, created_at, updated_at)
             VALUES (?, ?, ?, ?,
                     COALESCE((SELECT created_at FROM games WHERE game_id = ?), ?), ?)",
            params![
                game.game_id.as_u64(),
                game.season.as_u16(),
                game.session.to_string(),
                payload,
                game.game_id.as_u64(),
                now,
                now
            ],
        )?;
        self.conn.execute(
            "DELETE FROM skipped_games WHERE game_id = ?",
            params![game.game_id.as_u64()],
        )?;
        Ok(())
    }

    /// Whether a processed copy of the game is already cached
    pub fn has_game(&self, game_id: GameId) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM games WHERE game_id = ?",
            params![game_id.as_u64()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Load one cached game, if present
    pub fn load_game(&self, game_id: GameId) -> Result<Option<EnrichedGame>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM games WHERE game_id = ?",
                params![game_id.as_u64()],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Load the cached subset of the requested games, in request order
    pub fn load_games(&self, game_ids: &[GameId]) -> Result<Vec<EnrichedGame>> {
        let mut games = Vec::with_capacity(game_ids.len());
        for &game_id in game_ids {
            if let Some(game) = self.load_game(game_id)? {
                games.push(game);
            }
        }
        Ok(games)
    }

    /// Record why a game was skipped, replacing any earlier reason
    pub fn record_skip(&mut self, skip: &SkippedGame) -> Result<()> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        self.conn.execute(
            "INSERT OR REPLACE INTO skipped_games (game_id, reason, created_at)
             VALUES (?, ?, ?)",
            params![skip.game_id, skip.reason, now],
        )?;
        Ok(())
    }

    /// All standing skip records, oldest first
    pub fn list_skips(&self) -> Result<Vec<SkippedGame>> {
        let mut stmt = self
            .conn
            .prepare("SELECT game_id, reason FROM skipped_games ORDER BY created_at, game_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(SkippedGame {
                game_id: row.get(0)?,
                reason: row.get(1)?,
            })
        })?;
        let mut skips = Vec::new();
        for skip in rows {
            skips.push(skip?);
        }
        Ok(skips)
    }

    /// Drop one cached game
    pub fn clear_game(&mut self, game_id: GameId) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM games WHERE game_id = ?",
            params![game_id.as_u64()],
        )?;
        Ok(rows > 0)
    }
}
