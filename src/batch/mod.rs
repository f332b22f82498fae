//! Batch orchestration: the per-game pipeline and the parallel runner.
//!
//! Games are independent, so a malformed or unplayable game never takes
//! the batch down with it. Each failure becomes a skip record carrying
//! the offending game id and the reason, and the surviving games come
//! back in the order they were requested.

mod source;

pub use source::JsonDirSource;

use crate::adjust::{apply_adjustments, ShotQualityModel, WeightTable};
use crate::cli::types::{GameId, Season, Session};
use crate::enrich::{enrich_game, normalize_events};
use crate::error::{Result, RinkError};
use crate::identity::Normalizer;
use crate::model::{EnrichedEvent, GameMeta, RawEventRow, RawShiftRow, RosterEntry};
use crate::reconcile::{reconcile, ReconcileConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Everything a source must deliver for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBundle {
    pub meta: GameMeta,
    pub shifts: Vec<RawShiftRow>,
    pub events: Vec<RawEventRow>,
    pub roster: Vec<RosterEntry>,
}

/// Seam for the raw-data collaborator. Implementations must be shareable
/// across the worker pool.
pub trait GameSource: Sync {
    fn load(&self, game_id: GameId) -> Result<GameBundle>;
}

/// Batch-wide knobs.
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    pub workers: usize,
    pub shootout_seconds: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            shootout_seconds: 0,
        }
    }
}

/// One fully processed game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedGame {
    pub game_id: GameId,
    pub season: Season,
    pub session: Session,
    pub date: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub events: Vec<EnrichedEvent>,
}

/// A game the batch gave up on, and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedGame {
    pub game_id: u64,
    pub reason: String,
}

/// The outcome of one batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub games: Vec<EnrichedGame>,
    pub skipped: Vec<SkippedGame>,
}

/// Run the full pipeline for a single game.
pub fn process_game(
    game_id: GameId,
    source: &dyn GameSource,
    normalizer: &Normalizer,
    weights: &WeightTable,
    model: &ShotQualityModel,
    config: &BatchConfig,
) -> Result<EnrichedGame> {
    let session = game_id.session()?;
    let season = game_id.season();

    let mut bundle = source.load(game_id)?;
    bundle.meta.home_team = normalizer.team_code(&bundle.meta.home_team);
    bundle.meta.away_team = normalizer.team_code(&bundle.meta.away_team);
    if bundle.events.is_empty() {
        return Err(RinkError::NoEvents {
            game_id: game_id.as_u64(),
        });
    }

    let timeline = reconcile(
        game_id,
        &bundle.shifts,
        &bundle.roster,
        normalizer,
        season,
        session,
        ReconcileConfig {
            shootout_seconds: config.shootout_seconds,
        },
    )?;
    let events = normalize_events(
        &bundle.events,
        &bundle.roster,
        normalizer,
        season,
        session,
        config.shootout_seconds,
    );
    let mut enriched = enrich_game(&events, &timeline, &bundle.meta, bundle.meta.date.as_deref());
    apply_adjustments(&mut enriched, weights, model);

    Ok(EnrichedGame {
        game_id,
        season,
        session,
        date: bundle.meta.date,
        home_team: bundle.meta.home_team,
        away_team: bundle.meta.away_team,
        events: enriched,
    })
}

/// Process a batch of games across a bounded worker pool.
///
/// Per-game failures are demoted to skip records; only pool construction
/// itself can fail. Output order follows the request order on both lists.
pub fn process_games(
    game_ids: &[GameId],
    source: &dyn GameSource,
    config: &BatchConfig,
) -> Result<BatchOutcome> {
    let normalizer = Normalizer::default();
    let weights = WeightTable::embedded();
    let model = ShotQualityModel::embedded();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.max(1))
        .build()
        .map_err(|e| RinkError::Config {
            message: format!("failed to start worker pool: {e}"),
        })?;

    let results: Vec<(GameId, Result<EnrichedGame>)> = pool.install(|| {
        game_ids
            .par_iter()
            .map(|&id| {
                (
                    id,
                    process_game(id, source, &normalizer, &weights, &model, config),
                )
            })
            .collect()
    });

    let mut outcome = BatchOutcome::default();
    for (game_id, result) in results {
        match result {
            Ok(game) => outcome.games.push(game),
            Err(err) => outcome.skipped.push(SkippedGame {
                game_id: game_id.as_u64(),
                reason: err.to_string(),
            }),
        }
    }
    Ok(outcome)
}
