//! Grouping keys for StatRecord tables.
//!
//! The key is a typed struct with optional fields composed by an explicit
//! builder from the request configuration. Optional dimensions that are
//! switched off stay `None` rather than being spliced in and out of an ad
//! hoc string key.

use crate::cli::types::{AggLevel, GameId, Session};
use crate::model::state::{reverse_score, reverse_strength};
use crate::model::EnrichedEvent;

/// Which side of an event a key is built for. `Against` swaps the team
/// labels and reverses the strength and score states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    For,
    Against,
}

/// One StatRecord grouping key. Entity fields (player, unit) are filled by
/// the table builders; dimension fields by `KeyBuilder`.
///
/// The derived `Ord` covers every field in declaration order, so sorting
/// rows by key is a total order and repeated runs emit byte-identical
/// tables no matter how the accumulator maps iterate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GroupKey {
    pub season: u16,
    pub session: Option<Session>,
    pub game_id: Option<GameId>,
    pub game_date: Option<String>,
    pub period: Option<u8>,
    pub team: String,
    pub opp_team: Option<String>,
    pub strength_state: Option<String>,
    pub score_state: Option<String>,
    pub player_key: Option<String>,
    pub player_name: Option<String>,
    pub unit: Option<String>,
    pub teammates: Option<String>,
    pub opposition: Option<String>,
}

/// Composes dimension fields from the request flags.
#[derive(Debug, Clone, Copy)]
pub struct KeyBuilder {
    pub level: AggLevel,
    pub strength_state: bool,
    pub score_state: bool,
}

impl KeyBuilder {
    /// Dimension key for one event from the given team side.
    ///
    /// `team`/`opp` are the canonical codes of the keyed side and its
    /// opponent; `side_strength`/`side_score` must already be in the keyed
    /// side's perspective (use [`side_states`]).
    pub fn dimensions(
        &self,
        event: &EnrichedEvent,
        team: &str,
        opp: &str,
        side_strength: &str,
        side_score: &str,
    ) -> GroupKey {
        GroupKey {
            season: event.season.as_u16(),
            session: self.level.includes_session().then_some(event.session),
            game_id: self.level.includes_game().then_some(event.game_id),
            game_date: if self.level.includes_game() {
                event.game_date.clone()
            } else {
                None
            },
            period: self.level.includes_period().then_some(event.period),
            team: team.to_string(),
            opp_team: self.level.includes_game().then(|| opp.to_string()),
            strength_state: self.strength_state.then(|| side_strength.to_string()),
            score_state: self.score_state.then(|| side_score.to_string()),
            ..GroupKey::default()
        }
    }
}

/// Strength and score states of an event from the stated perspective of
/// the acting team (`For`) or its opponent (`Against`).
pub fn side_states(event: &EnrichedEvent, perspective: Perspective) -> (String, String) {
    match perspective {
        Perspective::For => (event.strength_state.clone(), event.score_state.clone()),
        Perspective::Against => (
            reverse_strength(&event.strength_state),
            reverse_score(&event.score_state),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::types::{AggLevel, Session};

    fn event() -> EnrichedEvent {
        crate::aggregate::tests::sample_event()
    }

    #[test]
    fn test_level_controls_optional_dimensions() {
        let ev = event();
        let season_key = KeyBuilder {
            level: AggLevel::Season,
            strength_state: false,
            score_state: false,
        }
        .dimensions(&ev, "BOS", "TOR", "5v5", "0v0");
        assert_eq!(season_key.season, 2023);
        assert!(season_key.session.is_none());
        assert!(season_key.game_id.is_none());
        assert!(season_key.period.is_none());
        assert!(season_key.opp_team.is_none());

        let period_key = KeyBuilder {
            level: AggLevel::Period,
            strength_state: true,
            score_state: true,
        }
        .dimensions(&ev, "BOS", "TOR", "5v4", "1v0");
        assert_eq!(period_key.period, Some(1));
        assert_eq!(period_key.game_id, Some(ev.game_id));
        assert_eq!(period_key.opp_team.as_deref(), Some("TOR"));
        assert_eq!(period_key.strength_state.as_deref(), Some("5v4"));
        assert_eq!(period_key.score_state.as_deref(), Some("1v0"));
    }

    #[test]
    fn test_against_perspective_reverses_states() {
        let mut ev = event();
        ev.strength_state = "5v4".to_string();
        ev.score_state = "2v1".to_string();
        let (strength, score) = side_states(&ev, Perspective::Against);
        assert_eq!(strength, "4v5");
        assert_eq!(score, "1v2");
        let (strength, score) = side_states(&ev, Perspective::For);
        assert_eq!(strength, "5v4");
        assert_eq!(score, "2v1");
    }

    #[test]
    fn test_ordering_separates_every_dimension() {
        let ev = event();
        let b = KeyBuilder {
            level: AggLevel::Game,
            strength_state: true,
            score_state: true,
        };
        let base = GroupKey {
            player_key: Some("B.ONE".to_string()),
            ..b.dimensions(&ev, "BOS", "TOR", "5v5", "0v0")
        };
        // Keys that tie on the tuple dimensions must still order by the
        // cut columns, or sorted output depends on map iteration order.
        let with_opposition = GroupKey {
            opposition: Some("T.ONE-T.TWO".to_string()),
            ..base.clone()
        };
        let other_opposition = GroupKey {
            opposition: Some("T.THREE-T.FOUR".to_string()),
            ..base.clone()
        };
        assert!(base < with_opposition);
        assert!(with_opposition < other_opposition);
        let playoffs = GroupKey {
            session: Some(Session::Playoffs),
            ..base.clone()
        };
        assert_ne!(base.cmp(&playoffs), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_identical_dimensions_hash_equal() {
        let ev = event();
        let b = KeyBuilder {
            level: AggLevel::Game,
            strength_state: true,
            score_state: false,
        };
        let k1 = b.dimensions(&ev, "BOS", "TOR", "5v5", "0v0");
        let k2 = b.dimensions(&ev, "BOS", "TOR", "5v5", "0v0");
        assert_eq!(k1, k2);
    }
}
