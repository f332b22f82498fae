//! Aggregation of enriched events into the four StatRecord tables.
//!
//! Individual stats credit the players listed on each event; On-Ice, Team,
//! and Line stats credit everyone present when it happened. All four share
//! the grouping-key machinery and the for/against merge, differ only in
//! accumulation, and validate against their column contract before they
//! leave this module.

mod individual;
mod key;
mod merge;
mod onice;
mod stats;

use crate::cli::types::{AggLevel, LineUnit, TableKind};
use crate::error::{Result, RinkError};
use crate::model::EnrichedEvent;
use crate::schema::{self, Table};
use individual::accumulate_individual;
use key::{GroupKey, KeyBuilder};
use onice::{accumulate_dual, Cuts, EntityMode};
use serde_json::{Map, Value};
use stats::{put_individual_columns, put_onice_columns, IndStats, SideStats};
use std::collections::HashMap;

/// One aggregation run's configuration.
#[derive(Debug, Clone, Copy)]
pub struct AggregateRequest {
    pub table: TableKind,
    pub level: AggLevel,
    pub strength_state: bool,
    pub score_state: bool,
    pub teammates: bool,
    pub opposition: bool,
    /// Which unit the Line table groups by; ignored by the other tables.
    pub position: LineUnit,
}

impl AggregateRequest {
    /// Reject flag combinations that cannot key a row.
    pub fn validate(&self) -> Result<()> {
        if self.table == TableKind::Team && (self.teammates || self.opposition) {
            return Err(RinkError::Config {
                message: "teammate and opposition cuts are not defined for the team table"
                    .to_string(),
            });
        }
        Ok(())
    }
}

impl Default for AggregateRequest {
    fn default() -> Self {
        Self {
            table: TableKind::OnIce,
            level: AggLevel::Game,
            strength_state: false,
            score_state: false,
            teammates: false,
            opposition: false,
            position: LineUnit::Forwards,
        }
    }
}

/// Aggregate an enriched event stream into one validated StatRecord table.
///
/// Rows are sorted by their grouping key, so repeated runs over the same
/// events produce byte-identical output. Rows that accrued no time on ice
/// are dropped.
pub fn aggregate(events: &[EnrichedEvent], request: &AggregateRequest) -> Result<Table> {
    request.validate()?;
    let builder = KeyBuilder {
        level: request.level,
        strength_state: request.strength_state,
        score_state: request.score_state,
    };
    let cuts = Cuts {
        teammates: request.teammates,
        opposition: request.opposition,
    };

    let rows = match request.table {
        TableKind::Individual => emit_individual(accumulate_individual(events, &builder, cuts)),
        TableKind::OnIce => emit_dual(accumulate_dual(events, &builder, EntityMode::Player, cuts)),
        TableKind::Team => emit_dual(accumulate_dual(events, &builder, EntityMode::Team, cuts)),
        TableKind::Line => emit_dual(accumulate_dual(
            events,
            &builder,
            EntityMode::Line(request.position),
            cuts,
        )),
    };

    schema::validate(rows, &schema::contracts::stat_contract(request.table))
}

fn emit_dual(map: HashMap<GroupKey, (SideStats, SideStats)>) -> Vec<Map<String, Value>> {
    let mut entries: Vec<_> = map.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
        .into_iter()
        .filter(|(_, (f, a))| f.toi + a.toi > 0.0)
        .map(|(key, (f, a))| {
            let mut row = Map::new();
            put_key_columns(&mut row, &key);
            put_onice_columns(&mut row, &f, &a);
            row
        })
        .collect()
}

fn emit_individual(map: HashMap<GroupKey, IndStats>) -> Vec<Map<String, Value>> {
    let mut entries: Vec<_> = map.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
        .into_iter()
        .filter(|(_, ind)| ind.toi > 0.0)
        .map(|(key, ind)| {
            let mut row = Map::new();
            put_key_columns(&mut row, &key);
            put_individual_columns(&mut row, &ind);
            row
        })
        .collect()
}

/// Emit the populated key dimensions; absent optional dimensions are left
/// out and filled with their contract defaults during validation.
fn put_key_columns(row: &mut Map<String, Value>, key: &GroupKey) {
    row.insert("season".to_string(), Value::from(key.season));
    if let Some(session) = key.session {
        row.insert("session".to_string(), Value::from(session.to_string()));
    }
    if let Some(game_id) = key.game_id {
        row.insert("game_id".to_string(), Value::from(game_id.as_u64()));
    }
    if let Some(date) = &key.game_date {
        row.insert("game_date".to_string(), Value::from(date.clone()));
    }
    if let Some(period) = key.period {
        row.insert("period".to_string(), Value::from(period));
    }
    row.insert("team".to_string(), Value::from(key.team.clone()));
    if let Some(opp) = &key.opp_team {
        row.insert("opp_team".to_string(), Value::from(opp.clone()));
    }
    if let Some(strength) = &key.strength_state {
        row.insert("strength_state".to_string(), Value::from(strength.clone()));
    }
    if let Some(score) = &key.score_state {
        row.insert("score_state".to_string(), Value::from(score.clone()));
    }
    if let Some(player) = &key.player_key {
        row.insert("player".to_string(), Value::from(player.clone()));
    }
    if let Some(name) = &key.player_name {
        row.insert("player_name".to_string(), Value::from(name.clone()));
    }
    if let Some(unit) = &key.unit {
        row.insert("unit".to_string(), Value::from(unit.clone()));
    }
    if let Some(teammates) = &key.teammates {
        row.insert("teammates".to_string(), Value::from(teammates.clone()));
    }
    if let Some(opposition) = &key.opposition {
        row.insert("opposition".to_string(), Value::from(opposition.clone()));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cli::types::{GameId, Season, Session};
    use crate::model::event::{EventPlayer, EventType};
    use crate::model::shift::PositionGroup;
    use crate::model::state::{AdjustedStats, Danger, OnIceSide, OnPlayer};

    fn on_player(key: String, group: PositionGroup) -> OnPlayer {
        let name = key.replace('.', " ");
        OnPlayer { key, name, group }
    }

    fn side(prefix: &str) -> OnIceSide {
        OnIceSide {
            forwards: vec![
                on_player(format!("{prefix}.ONE"), PositionGroup::Forward),
                on_player(format!("{prefix}.TWO"), PositionGroup::Forward),
                on_player(format!("{prefix}.THREE"), PositionGroup::Forward),
            ],
            defense: vec![
                on_player(format!("{prefix}.FOUR"), PositionGroup::Defense),
                on_player(format!("{prefix}.FIVE"), PositionGroup::Defense),
            ],
            goalie: Some(on_player(format!("{prefix}.GOALIE"), PositionGroup::Goalie)),
        }
    }

    /// A 5v5 shot by the hosting Bruins at 10:00 of the first period, with
    /// full on-ice complements. Shared fixture for the aggregation tests.
    pub(crate) fn sample_event() -> EnrichedEvent {
        EnrichedEvent {
            game_id: GameId::new(2023020500),
            season: Season::new(2023),
            session: Session::Regular,
            game_date: Some("2023-12-01".to_string()),
            period: 1,
            period_seconds: 600,
            game_seconds: 600,
            event_index: 10,
            event_type: EventType::Shot,
            team: "BOS".to_string(),
            opp_team: "TOR".to_string(),
            home_team: "BOS".to_string(),
            away_team: "TOR".to_string(),
            is_home: true,
            p1: Some(EventPlayer::new("B.ONE", "B ONE")),
            p2: None,
            p3: None,
            coords: Some((70.0, 10.0)),
            description: "BOS ONGOAL - B.ONE".to_string(),
            home_on: side("B"),
            away_on: side("T"),
            home_skaters: 5,
            away_skaters: 5,
            strength_state: "5v5".to_string(),
            score_state: "0v0".to_string(),
            home_score: 0,
            away_score: 0,
            zone: None,
            danger: Some(Danger::Medium),
            event_length: 12,
            excluded_from_onice: false,
            xg: Some(0.05),
            adj: AdjustedStats {
                shot_adj: 1.01,
                fenwick_adj: 1.01,
                corsi_adj: 1.01,
                xg_adj: 0.0505,
                ..AdjustedStats::default()
            },
        }
    }

    fn goal_event() -> EnrichedEvent {
        let mut ev = sample_event();
        ev.event_type = EventType::Goal;
        ev.score_state = "1v0".to_string();
        ev.home_score = 1;
        ev.xg = Some(0.08);
        ev.adj = AdjustedStats {
            goal_adj: 1.02,
            shot_adj: 1.02,
            fenwick_adj: 1.02,
            corsi_adj: 1.02,
            xg_adj: 0.0816,
            ..AdjustedStats::default()
        };
        ev
    }

    fn away_shot_event() -> EnrichedEvent {
        let mut ev = sample_event();
        ev.team = "TOR".to_string();
        ev.opp_team = "BOS".to_string();
        ev.is_home = false;
        ev.p1 = Some(EventPlayer::new("T.ONE", "T ONE"));
        ev.event_index = 11;
        ev.game_seconds = 640;
        ev.period_seconds = 640;
        ev.event_length = 40;
        ev
    }

    fn cell(table: &Table, row: usize, name: &str) -> Value {
        table.get(row, name).cloned().unwrap_or(Value::Null)
    }

    fn request(table: TableKind) -> AggregateRequest {
        AggregateRequest {
            table,
            ..AggregateRequest::default()
        }
    }

    #[test]
    fn test_team_table_single_goal() {
        let table = aggregate(&[goal_event()], &request(TableKind::Team)).unwrap();
        assert_eq!(table.rows.len(), 2);
        // Sorted by team: BOS first.
        assert_eq!(cell(&table, 0, "team"), Value::from("BOS"));
        assert_eq!(cell(&table, 0, "gf"), Value::from(1.0));
        assert_eq!(cell(&table, 0, "ga"), Value::from(0.0));
        assert_eq!(cell(&table, 1, "team"), Value::from("TOR"));
        assert_eq!(cell(&table, 1, "gf"), Value::from(0.0));
        assert_eq!(cell(&table, 1, "ga"), Value::from(1.0));
        // Both sides carry the same 0.2 minutes of ice time.
        assert_eq!(cell(&table, 0, "toi"), cell(&table, 1, "toi"));
    }

    #[test]
    fn test_individual_table_credits_scorer() {
        let req = AggregateRequest {
            table: TableKind::Individual,
            strength_state: true,
            score_state: true,
            ..AggregateRequest::default()
        };
        let table = aggregate(&[goal_event()], &req).unwrap();
        let scorer = (0..table.rows.len())
            .find(|&i| cell(&table, i, "player") == Value::from("B.ONE"))
            .unwrap();
        assert_eq!(cell(&table, scorer, "g"), Value::from(1.0));
        assert_eq!(cell(&table, scorer, "a1"), Value::from(0.0));
        assert_eq!(cell(&table, scorer, "a2"), Value::from(0.0));
        assert_eq!(cell(&table, scorer, "strength_state"), Value::from("5v5"));
        assert_eq!(cell(&table, scorer, "score_state"), Value::from("1v0"));
        assert_eq!(cell(&table, scorer, "toi"), Value::from(0.2));
    }

    #[test]
    fn test_onice_table_rows_all_twelve_players() {
        let table = aggregate(&[goal_event()], &request(TableKind::OnIce)).unwrap();
        assert_eq!(table.rows.len(), 12);
        let teammate = (0..table.rows.len())
            .find(|&i| cell(&table, i, "player") == Value::from("B.FIVE"))
            .unwrap();
        assert_eq!(cell(&table, teammate, "gf"), Value::from(1.0));
        assert_eq!(cell(&table, teammate, "gf_percent"), Value::from(1.0));
    }

    #[test]
    fn test_for_against_conservation() {
        let events = vec![goal_event(), away_shot_event(), sample_event()];
        let table = aggregate(&events, &request(TableKind::Team)).unwrap();
        for (forv, against) in [("gf", "ga"), ("sf", "sa"), ("cf", "ca"), ("xgf", "xga")] {
            let for_sum: f64 = (0..table.rows.len())
                .map(|i| cell(&table, i, forv).as_f64().unwrap())
                .sum();
            let against_sum: f64 = (0..table.rows.len())
                .map(|i| cell(&table, i, against).as_f64().unwrap())
                .sum();
            assert!(
                (for_sum - against_sum).abs() < 1e-9,
                "{forv}/{against} out of balance: {for_sum} vs {against_sum}"
            );
        }
    }

    #[test]
    fn test_repeated_runs_are_byte_identical() {
        let events = vec![goal_event(), away_shot_event(), sample_event()];
        let req = AggregateRequest {
            table: TableKind::OnIce,
            strength_state: true,
            score_state: true,
            teammates: true,
            ..AggregateRequest::default()
        };
        let first = serde_json::to_string(&aggregate(&events, &req).unwrap()).unwrap();
        let second = serde_json::to_string(&aggregate(&events, &req).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_opposition_cut_runs_are_byte_identical() {
        // Two events identical except for the opposing unit produce rows
        // that tie on every tuple dimension and differ only in the
        // opposition column; ordering must still be stable across runs.
        let mut second = sample_event();
        second.away_on = side("U");
        second.event_index = 12;
        let events = vec![sample_event(), second];
        let req = AggregateRequest {
            table: TableKind::OnIce,
            opposition: true,
            ..AggregateRequest::default()
        };
        let first = serde_json::to_string(&aggregate(&events, &req).unwrap()).unwrap();
        for _ in 0..32 {
            let rerun = serde_json::to_string(&aggregate(&events, &req).unwrap()).unwrap();
            assert_eq!(first, rerun);
        }
    }

    #[test]
    fn test_zero_toi_rows_dropped() {
        let mut ev = sample_event();
        ev.event_length = 0;
        let table = aggregate(&[ev], &request(TableKind::Team)).unwrap();
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_line_table_sorts_unit_members() {
        let req = AggregateRequest {
            table: TableKind::Line,
            position: LineUnit::Defense,
            ..AggregateRequest::default()
        };
        let table = aggregate(&[sample_event()], &req).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(cell(&table, 0, "unit"), Value::from("B.FIVE-B.FOUR"));
        assert_eq!(cell(&table, 1, "unit"), Value::from("T.FIVE-T.FOUR"));
    }

    #[test]
    fn test_team_table_rejects_cuts() {
        let req = AggregateRequest {
            table: TableKind::Team,
            teammates: true,
            ..AggregateRequest::default()
        };
        let err = aggregate(&[sample_event()], &req).unwrap_err();
        assert!(matches!(err, RinkError::Config { .. }));
    }

    #[test]
    fn test_excluded_event_leaves_no_onice_trace() {
        let mut ev = sample_event();
        ev.excluded_from_onice = true;
        let table = aggregate(&[ev], &request(TableKind::OnIce)).unwrap();
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_default_level_omits_period() {
        let table = aggregate(&[sample_event()], &request(TableKind::Team)).unwrap();
        // Game level fills period with the contract default.
        assert_eq!(cell(&table, 0, "period"), Value::from(0));
        assert_eq!(cell(&table, 0, "game_id"), Value::from(2023020500u64));
    }
}
