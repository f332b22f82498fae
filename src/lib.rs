//! NHL Shift and Play-by-Play Analytics Engine
//!
//! A Rust library for turning the league's two raw per-game feeds (the
//! shift log and the play-by-play event log) into analysis-ready data:
//!
//! - **Reconciliation**: merge the shift timeline with the ordered event
//!   stream, patching goalie coverage gaps in the raw feed
//! - **State Enrichment**: attach the full on-ice context (skaters,
//!   goalies, strength state, score state) to every event
//! - **Adjustment**: score/venue-deflated counting stats and a shot
//!   quality (expected goals) model
//! - **Aggregation**: Individual, On-Ice, Team, and Line tables at
//!   period, game, session, or season level
//! - **Validation**: every output table is held to an explicit column
//!   contract
//! - **Storage**: local caching of processed games
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rinkstats::batch::{process_games, BatchConfig, JsonDirSource};
//! use rinkstats::GameId;
//!
//! # fn example() -> rinkstats::Result<()> {
//! let source = JsonDirSource::new("./bundles");
//! let outcome = process_games(
//!     &[GameId::new(2023020001)],
//!     &source,
//!     &BatchConfig::default(),
//! )?;
//! for game in &outcome.games {
//!     println!("{}: {} events", game.game_id, game.events.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod adjust;
pub mod aggregate;
pub mod batch;
pub mod cli;
pub mod commands;
pub mod enrich;
pub mod error;
pub mod identity;
pub mod model;
pub mod reconcile;
pub mod schema;
pub mod storage;

// Re-export commonly used types
pub use cli::types::{AggLevel, GameId, LineUnit, Season, Session, TableKind};
pub use error::{Result, RinkError};
