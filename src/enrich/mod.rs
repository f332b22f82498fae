//! State enrichment: attach full on-ice context to the ordered event stream.
//!
//! Enrichment is an explicit left-to-right fold. A small `RunningContext`
//! (current score, last known on-ice state) is carried forward across the
//! time-ordered events; nothing is looked up positionally in a mutable
//! table. The stream order `(period, game_seconds, event_index)` is
//! load-bearing.

pub mod corrections;


use crate::cli::types::{Season, Session};
use crate::identity::Normalizer;
use crate::model::{
    period_start_game_seconds, AdjustedStats, Danger, EnrichedEvent, Event, EventPlayer,
    EventType, GameMeta, OnIceSide, RawEventRow, RosterEntry, Zone,
};
use crate::reconcile::ShiftTimeline;
use std::collections::HashMap;

/// Net-to-net coordinates: goal lines sit at x = +/-89, y spans the width.
const GOAL_LINE_X: f64 = 89.0;

/// Running state carried across the fold.
#[derive(Debug, Clone, Default)]
struct RunningContext {
    home_score: u8,
    away_score: u8,
    last_home_on: OnIceSide,
    last_away_on: OnIceSide,
    last_game_seconds: u32,
}

/// Normalize raw play-by-play rows into ordered `Event`s for one game:
/// canonical team codes, resolved identities, period seconds, a stable
/// tie-break index.
pub fn normalize_events(
    rows: &[RawEventRow],
    roster: &[RosterEntry],
    normalizer: &Normalizer,
    season: Season,
    session: Session,
    shootout_seconds: u32,
) -> Vec<Event> {
    let positions: HashMap<String, String> = roster
        .iter()
        .map(|r| {
            (
                crate::identity::clean_name(&r.name),
                r.position.to_uppercase(),
            )
        })
        .collect();

    let resolve = |p: &crate::model::RawPlayer| -> EventPlayer {
        let position = positions.get(&crate::identity::clean_name(&p.name));
        let id = normalizer.normalize(&p.name, season, position.map(String::as_str), p.jersey);
        EventPlayer::new(id.key, id.display_name)
    };

    let mut events: Vec<Event> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let start = period_start_game_seconds(row.period, session, shootout_seconds);
            let mut slots = row.players.iter();
            Event {
                game_id: row.game_id,
                season,
                session,
                period: row.period,
                period_seconds: row.game_seconds.saturating_sub(start),
                game_seconds: row.game_seconds,
                event_index: i as u32,
                event_type: EventType::from_abbrev(&row.event_type),
                team: if row.team.trim().is_empty() {
                    String::new()
                } else {
                    normalizer.team_code(&row.team)
                },
                p1: slots.next().map(resolve),
                p2: slots.next().map(resolve),
                p3: slots.next().map(resolve),
                coords: row.coords,
                description: row.description.clone(),
            }
        })
        .collect();

    events.sort_by_key(Event::order_key);
    events
}

/// Walk the ordered stream and attach on-ice context to every event.
///
/// `meta` must carry canonical team codes. Events with no overlapping
/// shift data fall back to the last known state and are flagged
/// `excluded_from_onice` instead of failing the game.
pub fn enrich_game(
    events: &[Event],
    timeline: &ShiftTimeline,
    meta: &GameMeta,
    game_date: Option<&str>,
) -> Vec<EnrichedEvent> {
    let home = meta.home_team.as_str();
    let away = meta.away_team.as_str();

    let mut ctx = RunningContext::default();
    let mut out: Vec<EnrichedEvent> = Vec::with_capacity(events.len());

    for raw in events {
        let mut event = raw.clone();
        corrections::fix_blocked_shot(&mut event, home, away);
        corrections::fix_bench_minor(&mut event);
        corrections::fix_faceoff_order(&mut event, home);

        let period_len = timeline.period_len(event.period);
        let mut home_on = timeline.on_ice(home, event.period, event.period_seconds);
        let mut away_on = timeline.on_ice(away, event.period, event.period_seconds);

        let excluded = home_on.is_empty() && away_on.is_empty();
        if excluded {
            home_on = ctx.last_home_on.clone();
            away_on = ctx.last_away_on.clone();
        }

        // Goals show the post-goal score; shootout goals don't move the
        // running score, the shootout is settled as one goal elsewhere.
        if event.event_type == EventType::Goal && period_len > 0 {
            if event.team == home {
                ctx.home_score += 1;
            } else if event.team == away {
                ctx.away_score += 1;
            }
        }

        let is_home = event.team.is_empty() || event.team == home;
        let (acting, opposing) = if is_home {
            (&home_on, &away_on)
        } else {
            (&away_on, &home_on)
        };
        let strength_state = format!(
            "{}v{}",
            acting.strength_token(),
            opposing.strength_token()
        );
        let (own_score, opp_score) = if is_home {
            (ctx.home_score, ctx.away_score)
        } else {
            (ctx.away_score, ctx.home_score)
        };
        let score_state = format!("{}v{}", own_score, opp_score);

        let zone = match event.event_type {
            EventType::Fac => zone_from_description(&event.description),
            _ => None,
        };
        let danger = match (event.event_type.is_corsi(), event.coords) {
            (true, Some((x, y))) => Some(danger_from_coords(x, y)),
            _ => None,
        };

        let event_length = if out.is_empty() {
            0
        } else {
            event.game_seconds.saturating_sub(ctx.last_game_seconds)
        };

        let enriched = EnrichedEvent {
            game_id: event.game_id,
            season: event.season,
            session: event.session,
            game_date: game_date.map(str::to_string),
            period: event.period,
            period_seconds: event.period_seconds,
            game_seconds: event.game_seconds,
            event_index: event.event_index,
            event_type: event.event_type,
            team: event.team.clone(),
            opp_team: if event.team.is_empty() {
                String::new()
            } else if is_home {
                away.to_string()
            } else {
                home.to_string()
            },
            home_team: home.to_string(),
            away_team: away.to_string(),
            is_home,
            p1: event.p1.clone(),
            p2: event.p2.clone(),
            p3: event.p3.clone(),
            coords: event.coords,
            description: event.description.clone(),
            home_skaters: home_on.skater_count(),
            away_skaters: away_on.skater_count(),
            home_on,
            away_on,
            strength_state,
            score_state,
            home_score: ctx.home_score,
            away_score: ctx.away_score,
            zone,
            danger,
            event_length,
            excluded_from_onice: excluded,
            xg: None,
            adj: AdjustedStats::default(),
        };

        if !excluded {
            ctx.last_home_on = enriched.home_on.clone();
            ctx.last_away_on = enriched.away_on.clone();
        }
        ctx.last_game_seconds = event.game_seconds;
        out.push(enriched);
    }

    bleed_opening_changes(&mut out);
    assign_change_zones(&mut out);
    out
}

/// A CHANGE recorded at the very start of a period snapshots the pre-period
/// ice, which reads as an empty net. Such events inherit the strength,
/// score, and goalie state of the next real event instead.
fn bleed_opening_changes(events: &mut [EnrichedEvent]) {
    for i in 0..events.len() {
        if events[i].event_type != EventType::Change
            || events[i].period_seconds != 0
            || !events[i].strength_state.contains('E')
        {
            continue;
        }
        let next = events[i + 1..].iter().find(|e| {
            e.period == events[i].period
                && !matches!(e.event_type, EventType::Change | EventType::Pstr)
        });
        let Some(next) = next else { continue };

        let home_strength = if next.is_home {
            next.strength_state.clone()
        } else {
            crate::model::state::reverse_strength(&next.strength_state)
        };
        let home_goalie = next.home_on.goalie.clone();
        let away_goalie = next.away_on.goalie.clone();
        let home_skaters = next.home_skaters;
        let away_skaters = next.away_skaters;
        let (home_score, away_score) = (next.home_score, next.away_score);

        let e = &mut events[i];
        e.home_on.goalie = home_goalie;
        e.away_on.goalie = away_goalie;
        e.home_skaters = home_skaters;
        e.away_skaters = away_skaters;
        e.home_score = home_score;
        e.away_score = away_score;
        e.strength_state = if e.is_home {
            home_strength
        } else {
            crate::model::state::reverse_strength(&home_strength)
        };
        let (own, opp) = if e.is_home {
            (home_score, away_score)
        } else {
            (away_score, home_score)
        };
        e.score_state = format!("{}v{}", own, opp);
    }
}

/// Changes made during a stoppage start in the zone of the faceoff that
/// follows; attach that zone, flipped when the faceoff winner is the other
/// team.
fn assign_change_zones(events: &mut [EnrichedEvent]) {
    for i in 0..events.len() {
        if events[i].event_type != EventType::Change || events[i].team.is_empty() {
            continue;
        }
        let change_seconds = events[i].game_seconds;
        let fac = events[i + 1..]
            .iter()
            .take_while(|e| e.game_seconds <= change_seconds + 2)
            .find(|e| e.event_type == EventType::Fac)
            .and_then(|e| e.zone.map(|z| (z, e.team.clone())));
        if let Some((zone, fac_team)) = fac {
            events[i].zone = Some(if fac_team == events[i].team {
                zone
            } else {
                zone.flip()
            });
        }
    }
}

/// Parse the rink zone out of a faceoff description ("won Neu. Zone ...").
pub fn zone_from_description(description: &str) -> Option<Zone> {
    let up = description.to_uppercase();
    if up.contains("OFF. ZONE") || up.contains("OFFENSIVE ZONE") {
        Some(Zone::Off)
    } else if up.contains("DEF. ZONE") || up.contains("DEFENSIVE ZONE") {
        Some(Zone::Def)
    } else if up.contains("NEU. ZONE") || up.contains("NEUTRAL ZONE") {
        Some(Zone::Neu)
    } else {
        None
    }
}

/// Classify shot danger from shooting location: distance and angle to the
/// nearer net.
pub fn danger_from_coords(x: f64, y: f64) -> Danger {
    let (distance, angle) = shot_geometry(x, y);
    if distance <= 18.0 && angle <= 60.0 {
        Danger::High
    } else if distance <= 38.0 {
        Danger::Medium
    } else {
        Danger::Low
    }
}

/// Distance (feet) and absolute angle (degrees) to the nearer goal mouth.
pub fn shot_geometry(x: f64, y: f64) -> (f64, f64) {
    let dx = (GOAL_LINE_X - x.abs()).max(0.0);
    let distance = (dx * dx + y * y).sqrt();
    let angle = y.abs().atan2(dx).to_degrees();
    (distance, angle)
}
