//! Play-by-play event rows, raw and normalized.

use crate::cli::types::{GameId, Season, Session};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Play-by-play event classes as abbreviated in the source feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Goal,
    Shot,
    Miss,
    Block,
    Fac,
    Hit,
    Give,
    Take,
    Penl,
    Stop,
    Change,
    /// Period start
    Pstr,
    /// Period end
    Pend,
    /// Game end
    Gend,
    Other,
}

impl EventType {
    /// Parse the source feed's abbreviation; unknown strings map to `Other`
    /// rather than failing, since new feed codes appear between seasons.
    pub fn from_abbrev(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "GOAL" => EventType::Goal,
            "SHOT" => EventType::Shot,
            "MISS" => EventType::Miss,
            "BLOCK" => EventType::Block,
            "FAC" => EventType::Fac,
            "HIT" => EventType::Hit,
            "GIVE" => EventType::Give,
            "TAKE" => EventType::Take,
            "PENL" => EventType::Penl,
            "STOP" => EventType::Stop,
            "CHANGE" => EventType::Change,
            "PSTR" => EventType::Pstr,
            "PEND" => EventType::Pend,
            "GEND" => EventType::Gend,
            _ => EventType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Goal => "GOAL",
            EventType::Shot => "SHOT",
            EventType::Miss => "MISS",
            EventType::Block => "BLOCK",
            EventType::Fac => "FAC",
            EventType::Hit => "HIT",
            EventType::Give => "GIVE",
            EventType::Take => "TAKE",
            EventType::Penl => "PENL",
            EventType::Stop => "STOP",
            EventType::Change => "CHANGE",
            EventType::Pstr => "PSTR",
            EventType::Pend => "PEND",
            EventType::Gend => "GEND",
            EventType::Other => "OTHER",
        }
    }

    /// Corsi family: every shot attempt.
    pub fn is_corsi(&self) -> bool {
        matches!(
            self,
            EventType::Goal | EventType::Shot | EventType::Miss | EventType::Block
        )
    }

    /// Fenwick family: unblocked shot attempts.
    pub fn is_fenwick(&self) -> bool {
        matches!(self, EventType::Goal | EventType::Shot | EventType::Miss)
    }

    /// Shot on goal (goals included).
    pub fn is_shot_on_goal(&self) -> bool {
        matches!(self, EventType::Goal | EventType::Shot)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One player slot as the source feed records it: a name and maybe a jersey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlayer {
    pub name: String,
    pub jersey: Option<u8>,
}

/// A raw play-by-play row as delivered by the excluded fetch collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEventRow {
    pub game_id: GameId,
    pub period: u8,
    pub game_seconds: u32,
    pub event_type: String,
    /// Raw team code of the acting team; empty for neutral events.
    pub team: String,
    #[serde(default)]
    pub players: Vec<RawPlayer>,
    #[serde(default)]
    pub coords: Option<(f64, f64)>,
    #[serde(default)]
    pub description: String,
}

/// A normalized, identity-resolved player reference on an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventPlayer {
    /// Canonical cross-source identifier, e.g. `SIDNEY.CROSBY`.
    pub key: String,
    pub name: String,
}

impl EventPlayer {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// A normalized event, ordered within its game by
/// `(period, game_seconds, event_index)`. The index is the stable tie-break
/// for simultaneous rows; enrichment is a left-to-right scan over this order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub game_id: GameId,
    pub season: Season,
    pub session: Session,
    pub period: u8,
    pub period_seconds: u32,
    pub game_seconds: u32,
    pub event_index: u32,
    pub event_type: EventType,
    /// Canonical acting team code; empty for neutral events (STOP, PSTR...).
    pub team: String,
    pub p1: Option<EventPlayer>,
    pub p2: Option<EventPlayer>,
    pub p3: Option<EventPlayer>,
    pub coords: Option<(f64, f64)>,
    pub description: String,
}

impl Event {
    /// Sort key enforcing the load-bearing stream order.
    pub fn order_key(&self) -> (u8, u32, u32) {
        (self.period, self.game_seconds, self.event_index)
    }
}
