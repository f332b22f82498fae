//! Dual-perspective accumulation for the On-Ice, Team, and Line tables.
//!
//! Every event is visited once per side. The side that generated the event
//! accumulates into the "for" map, the other side into the "against" map,
//! and neutral events contribute time-on-ice only. The two maps are then
//! outer-joined with zero fill.

use super::key::{side_states, GroupKey, KeyBuilder, Perspective};
use super::merge::outer_merge;
use super::stats::SideStats;
use crate::cli::types::LineUnit;
use crate::model::{EnrichedEvent, OnIceSide};
use std::collections::HashMap;

/// What entity a dual table keys its rows by.
#[derive(Debug, Clone, Copy)]
pub(super) enum EntityMode {
    /// One row per player present on the ice.
    Player,
    /// One row per team side.
    Team,
    /// One row per forward or defense unit.
    Line(LineUnit),
}

/// Optional on-ice grouping cuts.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct Cuts {
    pub teammates: bool,
    pub opposition: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SideRole {
    Acting,
    Opposing,
    Neutral,
}

/// Build the merged (for, against) table for all events.
pub(super) fn accumulate_dual(
    events: &[EnrichedEvent],
    builder: &KeyBuilder,
    mode: EntityMode,
    cuts: Cuts,
) -> HashMap<GroupKey, (SideStats, SideStats)> {
    let mut for_map: HashMap<GroupKey, SideStats> = HashMap::new();
    let mut against_map: HashMap<GroupKey, SideStats> = HashMap::new();

    for event in events {
        if event.excluded_from_onice {
            continue;
        }
        for side_is_home in [true, false] {
            accumulate_side(
                event,
                side_is_home,
                builder,
                mode,
                cuts,
                &mut for_map,
                &mut against_map,
            );
        }
    }

    outer_merge(for_map, against_map)
}

fn accumulate_side(
    event: &EnrichedEvent,
    side_is_home: bool,
    builder: &KeyBuilder,
    mode: EntityMode,
    cuts: Cuts,
    for_map: &mut HashMap<GroupKey, SideStats>,
    against_map: &mut HashMap<GroupKey, SideStats>,
) {
    let (side_on, other_on) = if side_is_home {
        (&event.home_on, &event.away_on)
    } else {
        (&event.away_on, &event.home_on)
    };
    let (team, opp) = side_teams(event, side_is_home);
    if team.is_empty() {
        return;
    }

    let role = if event.team.is_empty() {
        SideRole::Neutral
    } else if event.team == team {
        SideRole::Acting
    } else {
        SideRole::Opposing
    };

    let (strength, score) = side_perspective(event, side_is_home);
    let dims = builder.dimensions(event, &team, &opp, &strength, &score);

    for entity in entities(mode, side_on) {
        let mut key = dims.clone();
        key.player_key = entity.player_key.clone();
        key.player_name = entity.player_name.clone();
        key.unit = entity.unit.clone();
        if cuts.teammates {
            key.teammates = Some(teammates_of(side_on, &entity));
        }
        if cuts.opposition {
            key.opposition = Some(joined_keys(other_on, None));
        }

        match role {
            SideRole::Acting => {
                let slot = for_map.entry(key).or_default();
                slot.toi += event.event_length as f64;
                slot.count_event(event);
            }
            SideRole::Opposing => {
                let slot = against_map.entry(key).or_default();
                slot.toi += event.event_length as f64;
                slot.count_event(event);
            }
            SideRole::Neutral => {
                for_map.entry(key).or_default().toi += event.event_length as f64;
            }
        }
    }
}

struct Entity {
    player_key: Option<String>,
    player_name: Option<String>,
    unit: Option<String>,
    member_keys: Vec<String>,
}

fn entities(mode: EntityMode, side_on: &OnIceSide) -> Vec<Entity> {
    match mode {
        EntityMode::Player => side_on
            .all()
            .map(|p| Entity {
                player_key: Some(p.key.clone()),
                player_name: Some(p.name.clone()),
                unit: None,
                member_keys: vec![p.key.clone()],
            })
            .collect(),
        EntityMode::Team => vec![Entity {
            player_key: None,
            player_name: None,
            unit: None,
            member_keys: Vec::new(),
        }],
        EntityMode::Line(unit) => {
            let members = match unit {
                LineUnit::Forwards => &side_on.forwards,
                LineUnit::Defense => &side_on.defense,
            };
            if members.is_empty() {
                return Vec::new();
            }
            let mut keys: Vec<String> = members.iter().map(|p| p.key.clone()).collect();
            keys.sort();
            vec![Entity {
                player_key: None,
                player_name: None,
                unit: Some(keys.join("-")),
                member_keys: keys,
            }]
        }
    }
}

/// Same-side players outside the entity, sorted and joined.
fn teammates_of(side_on: &OnIceSide, entity: &Entity) -> String {
    joined_keys(side_on, Some(&entity.member_keys))
}

pub(super) fn joined_keys(side: &OnIceSide, exclude: Option<&[String]>) -> String {
    let mut keys: Vec<&str> = side
        .all()
        .map(|p| p.key.as_str())
        .filter(|k| exclude.map(|ex| !ex.iter().any(|e| e == k)).unwrap_or(true))
        .collect();
    keys.sort_unstable();
    keys.join("-")
}

pub(super) fn side_teams(event: &EnrichedEvent, side_is_home: bool) -> (String, String) {
    if side_is_home {
        (event.home_team.clone(), event.away_team.clone())
    } else {
        (event.away_team.clone(), event.home_team.clone())
    }
}

/// Strength and score states from the stated side's perspective.
pub(super) fn side_perspective(event: &EnrichedEvent, side_is_home: bool) -> (String, String) {
    // The attached states are acting-team perspective; neutral events are
    // attached home-perspective.
    let perspective = if event.is_home == side_is_home {
        Perspective::For
    } else {
        Perspective::Against
    };
    side_states(event, perspective)
}
