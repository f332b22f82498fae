//! End-to-end pipeline tests: raw bundles in, StatRecord tables out.

use rinkstats::aggregate::{aggregate, AggregateRequest};
use rinkstats::batch::{process_games, BatchConfig, EnrichedGame, GameBundle, JsonDirSource};
use rinkstats::model::{EnrichedEvent, EventType, GameMeta, RawEventRow, RawPlayer, RawShiftRow, RosterEntry};
use rinkstats::schema::Table;
use rinkstats::{AggLevel, GameId, LineUnit, TableKind};
use serde_json::Value;

const GAME: u64 = 2023020777;

fn roster_entry(team: &str, jersey: u8, name: &str, position: &str) -> RosterEntry {
    RosterEntry {
        team: team.to_string(),
        jersey,
        name: name.to_string(),
        position: position.to_string(),
    }
}

fn shift(team: &str, name: &str, jersey: u8, start: u32, end: u32, is_goalie: bool) -> RawShiftRow {
    RawShiftRow {
        game_id: GameId::new(GAME),
        team: team.to_string(),
        period: 1,
        player: name.to_string(),
        jersey: Some(jersey),
        start_seconds: start,
        end_seconds: Some(end),
        duration: Some(end.saturating_sub(start)),
        is_goalie,
    }
}

fn event(
    game_seconds: u32,
    event_type: &str,
    team: &str,
    players: &[&str],
    coords: Option<(f64, f64)>,
    description: &str,
) -> RawEventRow {
    RawEventRow {
        game_id: GameId::new(GAME),
        period: 1,
        game_seconds,
        event_type: event_type.to_string(),
        team: team.to_string(),
        players: players
            .iter()
            .map(|name| RawPlayer {
                name: name.to_string(),
                jersey: None,
            })
            .collect(),
        coords,
        description: description.to_string(),
    }
}

/// One regulation period at steady 5v5. The home side scores an
/// unassisted goal at 10:00. The away goalie's shift feed has a 30
/// second hole around that goal, which reconciliation must close.
fn sample_bundle() -> GameBundle {
    let mut roster = Vec::new();
    let mut shifts = Vec::new();
    for (team, prefix) in [("BOS", "HOME"), ("TOR", "AWAY")] {
        let skaters = [
            (format!("{prefix} FIRST"), 11, "C"),
            (format!("{prefix} SECOND"), 12, "LW"),
            (format!("{prefix} THIRD"), 13, "RW"),
            (format!("{prefix} FOURTH"), 44, "D"),
            (format!("{prefix} FIFTH"), 45, "D"),
        ];
        for (name, jersey, position) in &skaters {
            roster.push(roster_entry(team, *jersey, name, position));
            shifts.push(shift(team, name, *jersey, 0, 1200, false));
        }
        roster.push(roster_entry(team, 30, &format!("{prefix} KEEPER"), "G"));
    }
    shifts.push(shift("BOS", "HOME KEEPER", 30, 0, 1200, true));
    // The hole: 580..610 uncovered in the raw feed.
    shifts.push(shift("TOR", "AWAY KEEPER", 30, 0, 580, true));
    shifts.push(shift("TOR", "AWAY KEEPER", 30, 610, 1200, true));

    let events = vec![
        event(
            0,
            "FAC",
            "BOS",
            &["AWAY FIRST", "HOME FIRST"],
            Some((0.0, 0.0)),
            "BOS won Neu. Zone - BOS #11 vs TOR #11",
        ),
        event(
            300,
            "SHOT",
            "BOS",
            &["HOME SECOND"],
            Some((60.0, 10.0)),
            "BOS ONGOAL - #12 Wrist Shot",
        ),
        event(
            600,
            "GOAL",
            "BOS",
            &["HOME FIRST"],
            Some((80.0, 3.0)),
            "BOS #11 Wrist Shot, unassisted",
        ),
        // Raw blocks arrive from the blocker's perspective.
        event(
            800,
            "BLOCK",
            "BOS",
            &["HOME FOURTH", "AWAY THIRD"],
            Some((-55.0, 20.0)),
            "TOR #13 shot BLOCKED BY BOS #44",
        ),
        event(
            900,
            "PENL",
            "TOR",
            &["AWAY SECOND"],
            None,
            "TOR TEAM Too many men/ice - bench(2 min) Served By: #12 AWAY SECOND",
        ),
        event(1200, "PEND", "", &[], None, "Period End"),
    ];

    GameBundle {
        meta: GameMeta {
            game_id: GameId::new(GAME),
            home_team: "BOS".to_string(),
            away_team: "TOR".to_string(),
            date: Some("2023-12-01".to_string()),
        },
        shifts,
        events,
        roster,
    }
}

fn processed_game() -> EnrichedGame {
    let dir = tempfile::tempdir().unwrap();
    let bundle = sample_bundle();
    std::fs::write(
        dir.path().join(format!("{GAME}.json")),
        serde_json::to_string(&bundle).unwrap(),
    )
    .unwrap();

    let source = JsonDirSource::new(dir.path());
    let mut outcome =
        process_games(&[GameId::new(GAME)], &source, &BatchConfig::default()).unwrap();
    assert!(outcome.skipped.is_empty(), "{:?}", outcome.skipped);
    outcome.games.remove(0)
}

fn find_row(table: &Table, column: &str, value: &Value) -> usize {
    (0..table.rows.len())
        .find(|&i| table.get(i, column) == Some(value))
        .unwrap_or_else(|| panic!("no row with {column} = {value}"))
}

fn cell_f64(table: &Table, row: usize, column: &str) -> f64 {
    table.get(row, column).and_then(Value::as_f64).unwrap()
}

fn request(table: TableKind) -> AggregateRequest {
    AggregateRequest {
        table,
        ..AggregateRequest::default()
    }
}

#[test]
fn test_goalie_coverage_hole_is_patched() {
    let game = processed_game();
    let goal: &EnrichedEvent = game
        .events
        .iter()
        .find(|e| e.event_type == EventType::Goal)
        .unwrap();
    // The raw feed left the net uncovered at 600; without patching this
    // would read 5vE.
    assert_eq!(goal.strength_state, "5v5");
    assert_eq!(goal.score_state, "1v0");
    assert!(!goal.excluded_from_onice);
    assert!(goal.xg.is_some());
}

#[test]
fn test_blocked_shot_reattributed_to_shooter() {
    let game = processed_game();
    let block = game
        .events
        .iter()
        .find(|e| e.event_type == EventType::Block)
        .unwrap();
    assert_eq!(block.team, "TOR");
    assert_eq!(block.p1.as_ref().unwrap().key, "AWAY.THIRD");
    assert_eq!(block.p2.as_ref().unwrap().key, "HOME.FOURTH");
}

#[test]
fn test_team_table_counts_and_conservation() {
    let game = processed_game();
    let table = aggregate(&game.events, &request(TableKind::Team)).unwrap();
    assert_eq!(table.rows.len(), 2);

    let bos = find_row(&table, "team", &Value::from("BOS"));
    let tor = find_row(&table, "team", &Value::from("TOR"));
    assert_eq!(cell_f64(&table, bos, "gf"), 1.0);
    assert_eq!(cell_f64(&table, bos, "sf"), 2.0);
    assert_eq!(cell_f64(&table, bos, "cf"), 2.0);
    assert_eq!(cell_f64(&table, tor, "ga"), 1.0);
    // The blocked attempt belongs to the shooting team's corsi.
    assert_eq!(cell_f64(&table, tor, "cf"), 1.0);
    assert_eq!(cell_f64(&table, tor, "ff"), 0.0);

    for (forv, against) in [("gf", "ga"), ("sf", "sa"), ("cf", "ca"), ("xgf", "xga")] {
        let f: f64 = (0..table.rows.len()).map(|i| cell_f64(&table, i, forv)).sum();
        let a: f64 = (0..table.rows.len()).map(|i| cell_f64(&table, i, against)).sum();
        assert!((f - a).abs() < 1e-9);
    }
    // 20 minutes of ice time on both rows.
    assert_eq!(cell_f64(&table, bos, "toi"), 20.0);
    assert_eq!(cell_f64(&table, tor, "toi"), 20.0);
}

#[test]
fn test_individual_table_role_credits() {
    let game = processed_game();
    let table = aggregate(&game.events, &request(TableKind::Individual)).unwrap();

    let scorer = find_row(&table, "player", &Value::from("HOME.FIRST"));
    assert_eq!(cell_f64(&table, scorer, "g"), 1.0);
    assert_eq!(cell_f64(&table, scorer, "a1"), 0.0);
    assert_eq!(cell_f64(&table, scorer, "a2"), 0.0);
    // The opening draw went to the home center.
    assert_eq!(cell_f64(&table, scorer, "fow"), 1.0);

    let loser = find_row(&table, "player", &Value::from("AWAY.FIRST"));
    assert_eq!(cell_f64(&table, loser, "fol"), 1.0);

    let blocker = find_row(&table, "player", &Value::from("HOME.FOURTH"));
    assert_eq!(cell_f64(&table, blocker, "blk"), 1.0);

    // Bench minor: the serving skater is not charged.
    let server = find_row(&table, "player", &Value::from("AWAY.SECOND"));
    assert_eq!(cell_f64(&table, server, "pent"), 0.0);
}

#[test]
fn test_onice_table_credits_teammates() {
    let game = processed_game();
    let table = aggregate(&game.events, &request(TableKind::OnIce)).unwrap();
    assert_eq!(table.rows.len(), 12);

    let teammate = find_row(&table, "player", &Value::from("HOME.FIFTH"));
    assert_eq!(cell_f64(&table, teammate, "gf"), 1.0);
    let opponent = find_row(&table, "player", &Value::from("AWAY.KEEPER"));
    assert_eq!(cell_f64(&table, opponent, "ga"), 1.0);
}

#[test]
fn test_score_split_attaches_goal_to_post_goal_state() {
    let game = processed_game();
    let req = AggregateRequest {
        table: TableKind::Team,
        score_state: true,
        ..AggregateRequest::default()
    };
    let table = aggregate(&game.events, &req).unwrap();

    let leading = (0..table.rows.len())
        .find(|&i| {
            table.get(i, "team") == Some(&Value::from("BOS"))
                && table.get(i, "score_state") == Some(&Value::from("1v0"))
        })
        .unwrap();
    assert_eq!(cell_f64(&table, leading, "gf"), 1.0);

    let tied = (0..table.rows.len())
        .find(|&i| {
            table.get(i, "team") == Some(&Value::from("BOS"))
                && table.get(i, "score_state") == Some(&Value::from("0v0"))
        })
        .unwrap();
    assert_eq!(cell_f64(&table, tied, "gf"), 0.0);
    assert_eq!(cell_f64(&table, tied, "sf"), 1.0);
}

#[test]
fn test_line_table_defense_pairs() {
    let game = processed_game();
    let req = AggregateRequest {
        table: TableKind::Line,
        position: LineUnit::Defense,
        ..AggregateRequest::default()
    };
    let table = aggregate(&game.events, &req).unwrap();
    assert_eq!(table.rows.len(), 2);
    let bos_pair = find_row(&table, "team", &Value::from("BOS"));
    assert_eq!(
        table.get(bos_pair, "unit"),
        Some(&Value::from("HOME.FIFTH-HOME.FOURTH"))
    );
    assert_eq!(cell_f64(&table, bos_pair, "gf"), 1.0);
}

#[test]
fn test_season_level_collapses_game_columns() {
    let game = processed_game();
    let req = AggregateRequest {
        table: TableKind::Team,
        level: AggLevel::Season,
        ..AggregateRequest::default()
    };
    let table = aggregate(&game.events, &req).unwrap();
    let bos = find_row(&table, "team", &Value::from("BOS"));
    assert_eq!(table.get(bos, "game_id"), Some(&Value::from(0)));
    assert_eq!(table.get(bos, "session"), Some(&Value::from("")));
    assert_eq!(table.get(bos, "strength_state"), Some(&Value::from("ALL")));
}

#[test]
fn test_aggregation_is_deterministic() {
    let game = processed_game();
    let req = AggregateRequest {
        table: TableKind::OnIce,
        strength_state: true,
        score_state: true,
        teammates: true,
        opposition: true,
        ..AggregateRequest::default()
    };
    let first = serde_json::to_string(&aggregate(&game.events, &req).unwrap()).unwrap();
    let second = serde_json::to_string(&aggregate(&game.events, &req).unwrap()).unwrap();
    assert_eq!(first, second);
}
