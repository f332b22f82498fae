//! Process command implementation

use super::{require_input_dir, storage_err};
use crate::batch::{process_games, BatchConfig, JsonDirSource, SkippedGame};
use crate::cli::types::GameId;
use crate::error::Result;
use crate::schema::{self, contracts};
use crate::storage::GameDatabase;
use serde_json::json;
use std::path::PathBuf;

/// Parameters for the process command
#[derive(Debug)]
pub struct ProcessParams {
    pub game_ids: Vec<GameId>,
    pub input_dir: Option<PathBuf>,
    pub threads: usize,
    pub shootout_seconds: u32,
    pub refresh: bool,
    pub as_json: bool,
}

/// Handle the process command
pub fn handle_process(params: ProcessParams) -> Result<()> {
    let mut db = GameDatabase::new().map_err(storage_err)?;

    let mut cached: Vec<GameId> = Vec::new();
    let mut to_process: Vec<GameId> = Vec::new();
    for &game_id in &params.game_ids {
        if !params.refresh && db.has_game(game_id).map_err(storage_err)? {
            cached.push(game_id);
        } else {
            to_process.push(game_id);
        }
    }

    let mut processed: Vec<(GameId, usize)> = Vec::new();
    let mut skipped: Vec<SkippedGame> = Vec::new();

    if !to_process.is_empty() {
        let input_dir = require_input_dir(params.input_dir)?;
        let source = JsonDirSource::new(input_dir);
        let config = BatchConfig {
            workers: params.threads.max(1),
            shootout_seconds: params.shootout_seconds,
        };
        let outcome = process_games(&to_process, &source, &config)?;
        skipped = outcome.skipped;

        for game in outcome.games {
            // Hold every outgoing game to the event-table contract before
            // it reaches the cache.
            let rows = game.events.iter().map(contracts::event_row).collect();
            match schema::validate(rows, &contracts::event_contract()) {
                Ok(table) => {
                    db.upsert_game(&game).map_err(storage_err)?;
                    processed.push((game.game_id, table.rows.len()));
                }
                Err(err) => skipped.push(SkippedGame {
                    game_id: game.game_id.as_u64(),
                    reason: err.to_string(),
                }),
            }
        }
        for skip in &skipped {
            db.record_skip(skip).map_err(storage_err)?;
        }
    }

    if params.as_json {
        let summary = json!({
            "processed": processed
                .iter()
                .map(|(id, events)| json!({"game_id": id.as_u64(), "events": events}))
                .collect::<Vec<_>>(),
            "cached": cached.iter().map(|id| id.as_u64()).collect::<Vec<_>>(),
            "skipped": skipped,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Processed {} games ({} cached, {} skipped)",
        processed.len(),
        cached.len(),
        skipped.len()
    );
    for (game_id, events) in &processed {
        println!("  {game_id}  {events} events");
    }
    if !skipped.is_empty() {
        println!("Skipped:");
        for skip in &skipped {
            println!("  {}  {}", skip.game_id, skip.reason);
        }
    }

    Ok(())
}
