//! Aggregate command implementation

use super::storage_err;
use crate::aggregate::{aggregate, AggregateRequest};
use crate::batch::{process_games, BatchConfig, EnrichedGame, JsonDirSource};
use crate::cli::types::{AggLevel, GameId, LineUnit, TableKind};
use crate::error::Result;
use crate::model::EnrichedEvent;
use crate::storage::GameDatabase;
use std::path::PathBuf;

/// Parameters for the aggregate command
#[derive(Debug)]
pub struct AggregateParams {
    pub game_ids: Vec<GameId>,
    pub input_dir: Option<PathBuf>,
    pub table: TableKind,
    pub level: AggLevel,
    pub strength: bool,
    pub score: bool,
    pub teammates: bool,
    pub opposition: bool,
    pub position: Option<LineUnit>,
    pub as_json: bool,
}

/// Handle the aggregate command
pub fn handle_aggregate(params: AggregateParams) -> Result<()> {
    let db = GameDatabase::new().map_err(storage_err)?;

    let mut games: Vec<EnrichedGame> = Vec::new();
    let mut missing: Vec<GameId> = Vec::new();
    for &game_id in &params.game_ids {
        match db.load_game(game_id).map_err(storage_err)? {
            Some(game) => games.push(game),
            None => missing.push(game_id),
        }
    }

    if !missing.is_empty() {
        match &params.input_dir {
            Some(dir) => {
                let outcome =
                    process_games(&missing, &JsonDirSource::new(dir), &BatchConfig::default())?;
                for skip in &outcome.skipped {
                    eprintln!("skipping game {}: {}", skip.game_id, skip.reason);
                }
                games.extend(outcome.games);
            }
            None => {
                for game_id in &missing {
                    eprintln!("game {game_id} is not cached; process it or pass --input-dir");
                }
            }
        }
    }

    let events: Vec<EnrichedEvent> = games
        .iter()
        .flat_map(|g| g.events.iter().cloned())
        .collect();

    let request = AggregateRequest {
        table: params.table,
        level: params.level,
        strength_state: params.strength,
        score_state: params.score,
        teammates: params.teammates,
        opposition: params.opposition,
        position: params.position.unwrap_or(LineUnit::Forwards),
    };
    let table = aggregate(&events, &request)?;

    if params.as_json {
        println!("{}", serde_json::to_string_pretty(&table.to_json())?);
    } else {
        print!("{table}");
    }
    Ok(())
}
