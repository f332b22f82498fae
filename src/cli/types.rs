//! Type-safe wrappers and enums shared between the CLI and the engine.

use crate::error::{Result, RinkError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for NHL game IDs.
///
/// NHL game ids are ten digits: `SSSSTTNNNN` where `SSSS` is the season
/// start year, `TT` the session code (01 preseason, 02 regular, 03
/// playoffs) and `NNNN` the game number.
///
/// # Examples
///
/// ```rust
/// use rinkstats::GameId;
///
/// let id = GameId::new(2023020001);
/// assert_eq!(id.as_u64(), 2023020001);
/// assert_eq!(id.to_string(), "2023020001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl GameId {
    /// Create a new GameId from a u64 value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Season start year encoded in the id (e.g. 2023 for 2023-24).
    pub fn season(&self) -> Season {
        Season::new((self.0 / 1_000_000) as u16)
    }

    /// Structural validation plus session extraction.
    ///
    /// Nine-or-fewer / eleven-or-more digit ids and unknown session codes
    /// are malformed and make the whole game unrecoverable.
    pub fn session(&self) -> Result<Session> {
        if self.0 < 1_000_000_000 || self.0 > 9_999_999_999 {
            return Err(RinkError::MalformedGameId {
                game_id: self.0,
                reason: "expected ten digits".to_string(),
            });
        }
        match (self.0 / 10_000) % 100 {
            1 => Ok(Session::Preseason),
            2 => Ok(Session::Regular),
            3 => Ok(Session::Playoffs),
            other => Err(RinkError::MalformedGameId {
                game_id: self.0,
                reason: format!("unknown session code {:02}", other),
            }),
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameId {
    type Err = RinkError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.parse()?))
    }
}

/// Type-safe wrapper for season start years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Season(pub u16);

impl Season {
    pub fn new(year: u16) -> Self {
        Self(year)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Default for Season {
    fn default() -> Self {
        Self(2024)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Season {
    type Err = RinkError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.parse().map_err(RinkError::InvalidGameId)?))
    }
}

/// Game session (schedule segment).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Session {
    Preseason,
    Regular,
    Playoffs,
}

impl Session {
    /// Overtime period length in seconds for this session.
    /// Regular-season OT is 5:00 at 3v3; playoff OT is a full period.
    pub fn overtime_seconds(&self) -> u32 {
        match self {
            Session::Playoffs => 1200,
            _ => 300,
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Preseason => write!(f, "PR"),
            Session::Regular => write!(f, "R"),
            Session::Playoffs => write!(f, "P"),
        }
    }
}

impl FromStr for Session {
    type Err = RinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "PR" | "PRESEASON" => Ok(Session::Preseason),
            "R" | "REGULAR" => Ok(Session::Regular),
            "P" | "PLAYOFFS" => Ok(Session::Playoffs),
            _ => Err(RinkError::Config {
                message: format!("Unknown session: {}", s),
            }),
        }
    }
}

/// Aggregation level for StatRecord tables.
///
/// Levels nest: period rows keep the game columns, game rows keep the
/// session columns, and so on up to season totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum AggLevel {
    Period,
    Game,
    Session,
    Season,
}

impl AggLevel {
    pub fn includes_game(&self) -> bool {
        matches!(self, AggLevel::Period | AggLevel::Game)
    }

    pub fn includes_period(&self) -> bool {
        matches!(self, AggLevel::Period)
    }

    pub fn includes_session(&self) -> bool {
        !matches!(self, AggLevel::Season)
    }
}

impl fmt::Display for AggLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggLevel::Period => write!(f, "period"),
            AggLevel::Game => write!(f, "game"),
            AggLevel::Session => write!(f, "session"),
            AggLevel::Season => write!(f, "season"),
        }
    }
}

/// Which StatRecord table shape to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TableKind {
    Individual,
    OnIce,
    Team,
    Line,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Individual => write!(f, "individual"),
            TableKind::OnIce => write!(f, "on-ice"),
            TableKind::Team => write!(f, "team"),
            TableKind::Line => write!(f, "line"),
        }
    }
}

/// Position group a Line table is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum LineUnit {
    Forwards,
    Defense,
}

impl fmt::Display for LineUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineUnit::Forwards => write!(f, "F"),
            LineUnit::Defense => write!(f, "D"),
        }
    }
}
