//! Shift rows and roster lookups.

use crate::cli::types::GameId;
use crate::model::event::EventPlayer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position group for on-ice partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionGroup {
    Forward,
    Defense,
    Goalie,
}

impl PositionGroup {
    /// Map a roster position code (C, LW, RW, F, D, G...) to its group.
    /// Unknown codes are treated as forwards, the most common group.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "D" | "LD" | "RD" => PositionGroup::Defense,
            "G" => PositionGroup::Goalie,
            _ => PositionGroup::Forward,
        }
    }

    pub fn is_skater(&self) -> bool {
        !matches!(self, PositionGroup::Goalie)
    }
}

impl fmt::Display for PositionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionGroup::Forward => write!(f, "F"),
            PositionGroup::Defense => write!(f, "D"),
            PositionGroup::Goalie => write!(f, "G"),
        }
    }
}

/// A raw shift row as delivered by the excluded fetch collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawShiftRow {
    pub game_id: GameId,
    pub team: String,
    pub period: u8,
    pub player: String,
    #[serde(default)]
    pub jersey: Option<u8>,
    pub start_seconds: u32,
    /// Blank in the source for shifts still open at a period buzzer.
    #[serde(default)]
    pub end_seconds: Option<u32>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub is_goalie: bool,
}

/// A normalized, identity-resolved shift interval `[start, end)` in period
/// seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub game_id: GameId,
    pub team: String,
    pub period: u8,
    pub player: EventPlayer,
    pub group: PositionGroup,
    pub start_seconds: u32,
    pub end_seconds: u32,
    pub is_goalie: bool,
}

impl Shift {
    pub fn duration(&self) -> u32 {
        self.end_seconds.saturating_sub(self.start_seconds)
    }

    /// Whether the player is on the ice at period second `s`.
    ///
    /// The interval is half-open, except that a shift ending exactly at the
    /// queried second counts when `s` is the period's final second, so the
    /// buzzer roster owns events stamped at the period end.
    pub fn covers(&self, s: u32, period_len: u32) -> bool {
        if s >= period_len && period_len > 0 {
            return self.start_seconds < period_len && self.end_seconds >= period_len;
        }
        self.start_seconds <= s && s < self.end_seconds
    }
}

/// One roster row: jersey number of a named player on a team, with position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub team: String,
    pub jersey: u8,
    pub name: String,
    pub position: String,
}

/// Static facts about one game supplied by the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMeta {
    pub game_id: GameId,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub date: Option<String>,
}
