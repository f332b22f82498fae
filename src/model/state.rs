//! Derived on-ice state attached to every enriched event.

use crate::cli::types::{GameId, Season, Session};
use crate::model::event::{EventPlayer, EventType};
use crate::model::shift::PositionGroup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rink zone relative to a stated team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Off,
    Neu,
    Def,
}

impl Zone {
    pub fn flip(&self) -> Zone {
        match self {
            Zone::Off => Zone::Def,
            Zone::Neu => Zone::Neu,
            Zone::Def => Zone::Off,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Off => "OFF",
            Zone::Neu => "NEU",
            Zone::Def => "DEF",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shot-danger classification from shooting location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Danger {
    High,
    Medium,
    Low,
}

impl Danger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Danger::High => "HIGH",
            Danger::Medium => "MEDIUM",
            Danger::Low => "LOW",
        }
    }
}

/// One player present on the ice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnPlayer {
    pub key: String,
    pub name: String,
    pub group: PositionGroup,
}

/// One team's on-ice roster at an instant, partitioned by position group.
/// Player lists keep the shift feed's listing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnIceSide {
    pub forwards: Vec<OnPlayer>,
    pub defense: Vec<OnPlayer>,
    pub goalie: Option<OnPlayer>,
}

impl OnIceSide {
    pub fn skater_count(&self) -> u8 {
        (self.forwards.len() + self.defense.len()) as u8
    }

    /// Strength-state token for this side: the skater count, or the
    /// empty-net sentinel when no goalie is on.
    pub fn strength_token(&self) -> String {
        if self.goalie.is_some() {
            self.skater_count().to_string()
        } else {
            "E".to_string()
        }
    }

    pub fn skaters(&self) -> impl Iterator<Item = &OnPlayer> {
        self.forwards.iter().chain(self.defense.iter())
    }

    pub fn all(&self) -> impl Iterator<Item = &OnPlayer> {
        self.forwards
            .iter()
            .chain(self.defense.iter())
            .chain(self.goalie.iter())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.all().any(|p| p.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.forwards.is_empty() && self.defense.is_empty() && self.goalie.is_none()
    }
}

/// Reverse a strength state to the opposing perspective: "5v4" -> "4v5".
/// Empty-net tokens swap sides unchanged: "5vE" -> "Ev5".
pub fn reverse_strength(state: &str) -> String {
    match state.split_once('v') {
        Some((a, b)) => format!("{}v{}", b, a),
        None => state.to_string(),
    }
}

/// Reverse a score state to the opposing perspective: "1v0" -> "0v1".
pub fn reverse_score(state: &str) -> String {
    reverse_strength(state)
}

/// Adjusted counting stats for one event, produced by the adjustment engine.
/// Zero for events outside the shot families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustedStats {
    pub goal_adj: f64,
    pub shot_adj: f64,
    pub miss_adj: f64,
    pub block_adj: f64,
    pub fenwick_adj: f64,
    pub corsi_adj: f64,
    pub xg_adj: f64,
}

/// An event with its full reconstructed on-ice context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedEvent {
    pub game_id: GameId,
    pub season: Season,
    pub session: Session,
    pub game_date: Option<String>,
    pub period: u8,
    pub period_seconds: u32,
    pub game_seconds: u32,
    pub event_index: u32,
    pub event_type: EventType,
    /// Canonical acting team; empty for neutral events.
    pub team: String,
    pub opp_team: String,
    pub home_team: String,
    pub away_team: String,
    /// Whether the acting team is the home team.
    pub is_home: bool,
    pub p1: Option<EventPlayer>,
    pub p2: Option<EventPlayer>,
    pub p3: Option<EventPlayer>,
    pub coords: Option<(f64, f64)>,
    pub description: String,
    pub home_on: OnIceSide,
    pub away_on: OnIceSide,
    pub home_skaters: u8,
    pub away_skaters: u8,
    /// Acting-team perspective, e.g. "5v4".
    pub strength_state: String,
    /// Acting-team perspective; goals show the post-goal score.
    pub score_state: String,
    pub home_score: u8,
    pub away_score: u8,
    /// Zone relative to the acting team, for faceoffs and changes.
    pub zone: Option<Zone>,
    pub danger: Option<Danger>,
    /// Seconds since the previous event in the stream; the TOI unit.
    pub event_length: u32,
    /// Set when no shift data overlapped this event and the last known
    /// state was carried forward; such events are excluded from on-ice
    /// (but not individual) statistics.
    pub excluded_from_onice: bool,
    pub xg: Option<f64>,
    #[serde(default)]
    pub adj: AdjustedStats,
}

impl EnrichedEvent {
    /// On-ice side of the acting team.
    pub fn acting_side(&self) -> &OnIceSide {
        if self.is_home {
            &self.home_on
        } else {
            &self.away_on
        }
    }

    /// On-ice side of the opposing team.
    pub fn opposing_side(&self) -> &OnIceSide {
        if self.is_home {
            &self.away_on
        } else {
            &self.home_on
        }
    }

    /// Goal differential from the acting team's perspective, as attached.
    pub fn score_diff(&self) -> i32 {
        let (own, opp) = if self.is_home {
            (self.home_score, self.away_score)
        } else {
            (self.away_score, self.home_score)
        };
        own as i32 - opp as i32
    }

    /// Strength state from the opposing team's perspective.
    pub fn opp_strength_state(&self) -> String {
        reverse_strength(&self.strength_state)
    }

    /// Score state from the opposing team's perspective.
    pub fn opp_score_state(&self) -> String {
        reverse_score(&self.score_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(key: &str, group: PositionGroup) -> OnPlayer {
        OnPlayer {
            key: key.to_string(),
            name: key.replace('.', " "),
            group,
        }
    }

    fn full_side() -> OnIceSide {
        OnIceSide {
            forwards: vec![
                player("A.ONE", PositionGroup::Forward),
                player("B.TWO", PositionGroup::Forward),
                player("C.THREE", PositionGroup::Forward),
            ],
            defense: vec![
                player("D.FOUR", PositionGroup::Defense),
                player("E.FIVE", PositionGroup::Defense),
            ],
            goalie: Some(player("G.SIX", PositionGroup::Goalie)),
        }
    }

    #[test]
    fn test_skater_count_excludes_goalie() {
        assert_eq!(full_side().skater_count(), 5);
    }

    #[test]
    fn test_strength_token_with_goalie() {
        assert_eq!(full_side().strength_token(), "5");
    }

    #[test]
    fn test_strength_token_empty_net() {
        let mut side = full_side();
        side.goalie = None;
        assert_eq!(side.strength_token(), "E");
    }

    #[test]
    fn test_reverse_strength_is_involutive() {
        for s in ["5v5", "5v4", "4v5", "5vE", "Ev5", "3v3"] {
            assert_eq!(reverse_strength(&reverse_strength(s)), s);
        }
        assert_eq!(reverse_strength("5v4"), "4v5");
        assert_eq!(reverse_strength("5vE"), "Ev5");
    }

    #[test]
    fn test_reverse_score() {
        assert_eq!(reverse_score("1v0"), "0v1");
        assert_eq!(reverse_score("2v2"), "2v2");
    }

    #[test]
    fn test_zone_flip() {
        assert_eq!(Zone::Off.flip(), Zone::Def);
        assert_eq!(Zone::Def.flip(), Zone::Off);
        assert_eq!(Zone::Neu.flip(), Zone::Neu);
    }

    #[test]
    fn test_side_contains() {
        let side = full_side();
        assert!(side.contains("G.SIX"));
        assert!(side.contains("A.ONE"));
        assert!(!side.contains("Z.NOBODY"));
    }
}
