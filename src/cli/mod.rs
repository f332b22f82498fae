//! CLI argument definitions and parsing.

pub mod types;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use types::{AggLevel, GameId, LineUnit, TableKind};

/// Arguments shared between commands
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Game ids to operate on (ten digits, e.g. 2023020001) - repeatable.
    #[clap(required = true)]
    pub game_ids: Vec<GameId>,

    /// Directory holding one raw `<game_id>.json` bundle per game.
    #[clap(long, short)]
    pub input_dir: Option<PathBuf>,

    /// Output results as JSON instead of a text table.
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
#[clap(name = "rinkstats", about = "NHL shift and play-by-play analytics engine")]
pub struct Rinkstats {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full enrichment pipeline over raw game bundles and cache
    /// the results.
    ///
    /// Reconciles the shift and event feeds, attaches on-ice state,
    /// applies score/venue adjustments and shot quality, then stores each
    /// game. Unplayable games are skipped and reported, never fatal.
    Process {
        #[clap(flatten)]
        common: CommonArgs,

        /// Worker threads for the batch.
        #[clap(long, short, default_value_t = 4)]
        threads: usize,

        /// Shootout length in seconds (0 drops shootout rows).
        #[clap(long, default_value_t = 0)]
        shootout_seconds: u32,

        /// Reprocess games even if a cached copy exists.
        #[clap(long)]
        refresh: bool,
    },

    /// Aggregate cached games into a StatRecord table.
    ///
    /// Games missing from the cache are processed on the fly when an
    /// input directory is given.
    Aggregate {
        #[clap(flatten)]
        common: CommonArgs,

        /// Which table shape to produce.
        #[clap(long, short = 'T', value_enum)]
        table: TableKind,

        /// Aggregation level.
        #[clap(long, short, value_enum, default_value_t = AggLevel::Game)]
        level: AggLevel,

        /// Split rows by strength state.
        #[clap(long)]
        strength: bool,

        /// Split rows by score state.
        #[clap(long)]
        score: bool,

        /// Split rows by the teammates on the ice.
        #[clap(long)]
        teammates: bool,

        /// Split rows by the opposing players on the ice.
        #[clap(long)]
        opposition: bool,

        /// Position group for the line table.
        #[clap(long, short, value_enum)]
        position: Option<LineUnit>,
    },
}
