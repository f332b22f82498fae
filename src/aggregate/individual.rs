//! Role-attributed accumulation for the Individual table.
//!
//! Unlike the dual tables, individual stats credit the specific players
//! listed on the event. Each role is keyed from its player's own team
//! perspective, so a faceoff loser's row carries the reversed strength
//! and score states of the winner's. Personal TOI accrues to everyone on
//! the ice regardless of role.

use super::key::{GroupKey, KeyBuilder};
use super::merge::union_add;
use super::onice::{joined_keys, side_perspective, side_teams, Cuts};
use super::stats::IndStats;
use crate::model::event::EventPlayer;
use crate::model::{EnrichedEvent, EventType, BENCH};
use std::collections::HashMap;

/// Build the keyed Individual stats for all events.
pub(super) fn accumulate_individual(
    events: &[EnrichedEvent],
    builder: &KeyBuilder,
    cuts: Cuts,
) -> HashMap<GroupKey, IndStats> {
    let mut toi_map: HashMap<GroupKey, IndStats> = HashMap::new();
    let mut role_map: HashMap<GroupKey, IndStats> = HashMap::new();

    for event in events {
        // Personal TOI follows the same exclusion rule as the on-ice
        // tables; role credits survive it since the listed players are
        // known even when the shift feed is not.
        if !event.excluded_from_onice {
            for side_is_home in [true, false] {
                let (team, _) = side_teams(event, side_is_home);
                if team.is_empty() {
                    continue;
                }
                let side_on = if side_is_home {
                    &event.home_on
                } else {
                    &event.away_on
                };
                for p in side_on.all() {
                    let key = row_key(event, builder, cuts, side_is_home, &p.key, &p.name);
                    toi_map.entry(key).or_default().toi += event.event_length as f64;
                }
            }
        }
        credit_roles(event, builder, cuts, &mut role_map);
    }

    union_add(vec![toi_map, role_map])
}

fn credit_roles(
    event: &EnrichedEvent,
    builder: &KeyBuilder,
    cuts: Cuts,
    map: &mut HashMap<GroupKey, IndStats>,
) {
    if event.team.is_empty() {
        return;
    }
    let acting = event.is_home;
    let opposing = !event.is_home;

    match event.event_type {
        EventType::Goal => {
            if let Some(p1) = &event.p1 {
                let s = slot(map, event, builder, cuts, acting, p1);
                s.g += 1.0;
                s.isf += 1.0;
                s.ixg += event.xg.unwrap_or(0.0);
            }
            if let Some(p2) = &event.p2 {
                slot(map, event, builder, cuts, acting, p2).a1 += 1.0;
            }
            if let Some(p3) = &event.p3 {
                slot(map, event, builder, cuts, acting, p3).a2 += 1.0;
            }
        }
        EventType::Shot => {
            if let Some(p1) = &event.p1 {
                let s = slot(map, event, builder, cuts, acting, p1);
                s.isf += 1.0;
                s.ixg += event.xg.unwrap_or(0.0);
            }
        }
        EventType::Miss => {
            if let Some(p1) = &event.p1 {
                let s = slot(map, event, builder, cuts, acting, p1);
                s.imsf += 1.0;
                s.ixg += event.xg.unwrap_or(0.0);
            }
        }
        // Post-correction convention: p1 is the shooter, p2 the blocker.
        EventType::Block => {
            if let Some(p1) = &event.p1 {
                slot(map, event, builder, cuts, acting, p1).ibf += 1.0;
            }
            if let Some(p2) = &event.p2 {
                slot(map, event, builder, cuts, opposing, p2).blk += 1.0;
            }
        }
        // Post-correction convention: p1 is the winner.
        EventType::Fac => {
            if let Some(p1) = &event.p1 {
                slot(map, event, builder, cuts, acting, p1).fow += 1.0;
            }
            if let Some(p2) = &event.p2 {
                slot(map, event, builder, cuts, opposing, p2).fol += 1.0;
            }
        }
        EventType::Hit => {
            if let Some(p1) = &event.p1 {
                slot(map, event, builder, cuts, acting, p1).hits += 1.0;
            }
            if let Some(p2) = &event.p2 {
                slot(map, event, builder, cuts, opposing, p2).hits_taken += 1.0;
            }
        }
        EventType::Penl => {
            // Bench minors carry the sentinel taker; no player is charged.
            if event.p1.as_ref().map(|p| p.key == BENCH).unwrap_or(false) {
                return;
            }
            if let Some(p1) = &event.p1 {
                slot(map, event, builder, cuts, acting, p1).pent += 1.0;
            }
            if let Some(p2) = &event.p2 {
                slot(map, event, builder, cuts, opposing, p2).pend += 1.0;
            }
        }
        EventType::Give => {
            if let Some(p1) = &event.p1 {
                slot(map, event, builder, cuts, acting, p1).give += 1.0;
            }
        }
        EventType::Take => {
            if let Some(p1) = &event.p1 {
                slot(map, event, builder, cuts, acting, p1).take += 1.0;
            }
        }
        _ => {}
    }
}

fn slot<'a>(
    map: &'a mut HashMap<GroupKey, IndStats>,
    event: &EnrichedEvent,
    builder: &KeyBuilder,
    cuts: Cuts,
    side_is_home: bool,
    player: &EventPlayer,
) -> &'a mut IndStats {
    let key = row_key(event, builder, cuts, side_is_home, &player.key, &player.name);
    map.entry(key).or_default()
}

fn row_key(
    event: &EnrichedEvent,
    builder: &KeyBuilder,
    cuts: Cuts,
    side_is_home: bool,
    player_key: &str,
    player_name: &str,
) -> GroupKey {
    let (team, opp) = side_teams(event, side_is_home);
    let (strength, score) = side_perspective(event, side_is_home);
    let mut key = builder.dimensions(event, &team, &opp, &strength, &score);
    key.player_key = Some(player_key.to_string());
    key.player_name = Some(player_name.to_string());
    let (side_on, other_on) = if side_is_home {
        (&event.home_on, &event.away_on)
    } else {
        (&event.away_on, &event.home_on)
    };
    if cuts.teammates {
        let exclude = [player_key.to_string()];
        key.teammates = Some(joined_keys(side_on, Some(&exclude)));
    }
    if cuts.opposition {
        key.opposition = Some(joined_keys(other_on, None));
    }
    key
}
