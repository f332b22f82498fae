//! Shift reconciliation: raw shift rows into a continuous roster timeline.
//!
//! Shift feeds are the least reliable of the two sources: end times go
//! missing at period buzzers, a handful of rows per season run backwards,
//! and goalie rows are dropped outright for whole periods. Everything here
//! is a patching rule; nothing in a reconciled timeline is allowed to leave
//! a goalie-coverage gap.

use crate::cli::types::{GameId, Season, Session};
use crate::error::Result;
use crate::identity::Normalizer;
use crate::model::{
    period_length, EventPlayer, OnIceSide, OnPlayer, PositionGroup, RawShiftRow, RosterEntry,
    Shift,
};
use std::collections::{BTreeSet, HashMap};


/// Reconciliation knobs. Shootout time accounting is a convention, not a
/// documented rule, so it stays configurable (default: shootouts carry no
/// on-ice time).
#[derive(Debug, Clone, Copy)]
pub struct ReconcileConfig {
    pub shootout_seconds: u32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            shootout_seconds: 0,
        }
    }
}

/// A per-team, per-period roster timeline with guaranteed goalie coverage.
#[derive(Debug, Clone)]
pub struct ShiftTimeline {
    session: Session,
    shootout_seconds: u32,
    shifts: HashMap<(String, u8), Vec<Shift>>,
    teams: Vec<String>,
    periods: Vec<u8>,
}

impl ShiftTimeline {
    pub fn session(&self) -> Session {
        self.session
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn periods(&self) -> &[u8] {
        &self.periods
    }

    pub fn period_len(&self, period: u8) -> u32 {
        period_length(period, self.session, self.shootout_seconds)
    }

    /// The team's on-ice roster at a period second, partitioned by
    /// position group. Listing order of the feed is preserved.
    pub fn on_ice(&self, team: &str, period: u8, second: u32) -> OnIceSide {
        let mut side = OnIceSide::default();
        let period_len = self.period_len(period);
        let Some(shifts) = self.shifts.get(&(team.to_string(), period)) else {
            return side;
        };
        for shift in shifts {
            if !shift.covers(second, period_len) {
                continue;
            }
            let on = OnPlayer {
                key: shift.player.key.clone(),
                name: shift.player.name.clone(),
                group: shift.group,
            };
            match shift.group {
                PositionGroup::Goalie => {
                    if side.goalie.is_none() {
                        side.goalie = Some(on);
                    }
                }
                PositionGroup::Defense => side.defense.push(on),
                PositionGroup::Forward => side.forwards.push(on),
            }
        }
        side
    }

    /// Total goalie-covered seconds for a (team, period). Equals the period
    /// length for every reconciled timeline; exposed for the conservation
    /// checks in tests.
    pub fn goalie_seconds(&self, team: &str, period: u8) -> u32 {
        self.shifts
            .get(&(team.to_string(), period))
            .map(|shifts| {
                shifts
                    .iter()
                    .filter(|s| s.group == PositionGroup::Goalie)
                    .map(Shift::duration)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Distinct skater-seconds for a (team, period), counting each player
    /// once per second they are on.
    pub fn skater_seconds(&self, team: &str, period: u8) -> u64 {
        self.shifts
            .get(&(team.to_string(), period))
            .map(|shifts| {
                shifts
                    .iter()
                    .filter(|s| s.group != PositionGroup::Goalie)
                    .map(|s| s.duration() as u64)
                    .sum()
            })
            .unwrap_or(0)
    }
}

/// Build the reconciled timeline for one game.
pub fn reconcile(
    game_id: GameId,
    rows: &[RawShiftRow],
    roster: &[RosterEntry],
    normalizer: &Normalizer,
    season: Season,
    session: Session,
    config: ReconcileConfig,
) -> Result<ShiftTimeline> {
    let positions = position_lookup(roster, normalizer);

    let mut shifts: HashMap<(String, u8), Vec<Shift>> = HashMap::new();
    let mut teams: Vec<String> = Vec::new();
    let mut periods: BTreeSet<u8> = BTreeSet::new();

    for row in rows {
        let team = normalizer.team_code(&row.team);
        let period_len = period_length(row.period, session, config.shootout_seconds);
        if period_len == 0 {
            continue;
        }

        let position = positions.position(&team, row.jersey, &row.player);
        let identity = normalizer.normalize(&row.player, season, position.as_deref(), row.jersey);

        // The shift feed's goalie flag wins over the roster position;
        // rosters occasionally list emergency goalies as skaters.
        let group = if row.is_goalie {
            PositionGroup::Goalie
        } else {
            position
                .as_deref()
                .map(PositionGroup::from_code)
                .unwrap_or(PositionGroup::Forward)
        };

        let start = row.start_seconds.min(period_len);
        // Blank end time: the shift ran to start + duration. No duration
        // either: it ran to the buzzer.
        let mut end = match (row.end_seconds, row.duration) {
            (Some(e), _) => e,
            (None, Some(d)) => start + d,
            (None, None) => period_len,
        };
        // End before start is bad source data: the shift owns the rest of
        // the period.
        if end < start {
            end = period_len;
        }
        end = end.min(period_len);
        if end <= start {
            continue;
        }

        if !teams.contains(&team) {
            teams.push(team.clone());
        }
        periods.insert(row.period);

        shifts
            .entry((team.clone(), row.period))
            .or_default()
            .push(Shift {
                game_id,
                team,
                period: row.period,
                player: EventPlayer::new(identity.key, identity.display_name),
                group,
                start_seconds: start,
                end_seconds: end,
                is_goalie: group == PositionGroup::Goalie,
            });
    }

    let periods: Vec<u8> = periods.into_iter().collect();
    for team in &teams {
        patch_goalie_coverage(
            game_id,
            team,
            &periods,
            &mut shifts,
            roster,
            normalizer,
            season,
            session,
            config,
        );
    }

    Ok(ShiftTimeline {
        session,
        shootout_seconds: config.shootout_seconds,
        shifts,
        teams,
        periods,
    })
}

/// Roster positions indexed by jersey and, as a fallback for shift feeds
/// that omit numbers, by cleaned name.
struct PositionIndex {
    by_jersey: HashMap<(String, u8), String>,
    by_name: HashMap<(String, String), String>,
}

impl PositionIndex {
    fn position(&self, team: &str, jersey: Option<u8>, raw_name: &str) -> Option<String> {
        if let Some(j) = jersey {
            if let Some(p) = self.by_jersey.get(&(team.to_string(), j)) {
                return Some(p.clone());
            }
        }
        self.by_name
            .get(&(team.to_string(), crate::identity::clean_name(raw_name)))
            .cloned()
    }
}

fn position_lookup(roster: &[RosterEntry], normalizer: &Normalizer) -> PositionIndex {
    let mut by_jersey = HashMap::new();
    let mut by_name = HashMap::new();
    for r in roster {
        let team = normalizer.team_code(&r.team);
        let position = r.position.to_uppercase();
        by_jersey.insert((team.clone(), r.jersey), position.clone());
        by_name.insert((team, crate::identity::clean_name(&r.name)), position);
    }
    PositionIndex { by_jersey, by_name }
}

/// Guarantee full-period goalie coverage for every (team, period).
///
/// Three defects are patched: no goalie rows at all for a period (a
/// full-period shift is synthesized, carrying the prior period's goalie
/// forward), gaps at either boundary (shifts are extended to the period
/// edges), and interior gaps or overlaps between consecutive goalie rows
/// (the earlier shift absorbs the gap; overlapping starts are trimmed).
#[allow(clippy::too_many_arguments)]
fn patch_goalie_coverage(
    game_id: GameId,
    team: &str,
    periods: &[u8],
    shifts: &mut HashMap<(String, u8), Vec<Shift>>,
    roster: &[RosterEntry],
    normalizer: &Normalizer,
    season: Season,
    session: Session,
    config: ReconcileConfig,
) {
    let mut last_goalie: Option<EventPlayer> = first_listed_goalie(team, periods, shifts)
        .or_else(|| roster_goalie(team, roster, normalizer, season));

    for &period in periods {
        let period_len = period_length(period, session, config.shootout_seconds);
        if period_len == 0 {
            continue;
        }
        let entry = shifts.entry((team.to_string(), period)).or_default();

        let mut goalie_idx: Vec<usize> = entry
            .iter()
            .enumerate()
            .filter(|(_, s)| s.group == PositionGroup::Goalie)
            .map(|(i, _)| i)
            .collect();
        goalie_idx.sort_by_key(|&i| entry[i].start_seconds);

        if goalie_idx.is_empty() {
            if let Some(goalie) = &last_goalie {
                entry.push(Shift {
                    game_id,
                    team: team.to_string(),
                    period,
                    player: goalie.clone(),
                    group: PositionGroup::Goalie,
                    start_seconds: 0,
                    end_seconds: period_len,
                    is_goalie: true,
                });
            }
            continue;
        }

        // Clamp the boundary shifts to the period edges.
        let first = goalie_idx[0];
        entry[first].start_seconds = 0;
        let last = *goalie_idx.last().unwrap_or(&first);
        entry[last].end_seconds = period_len;

        // Close interior gaps and trim overlaps pairwise.
        for w in goalie_idx.windows(2) {
            let (a, b) = (w[0], w[1]);
            let a_end = entry[a].end_seconds;
            let b_start = entry[b].start_seconds;
            match a_end.cmp(&b_start) {
                std::cmp::Ordering::Less => entry[a].end_seconds = b_start,
                std::cmp::Ordering::Greater => entry[b].start_seconds = a_end.min(period_len),
                std::cmp::Ordering::Equal => {}
            }
        }
        entry.retain(|s| s.group != PositionGroup::Goalie || s.end_seconds > s.start_seconds);

        last_goalie = entry
            .iter()
            .filter(|s| s.group == PositionGroup::Goalie)
            .max_by_key(|s| s.end_seconds)
            .map(|s| s.player.clone());
    }
}

fn first_listed_goalie(
    team: &str,
    periods: &[u8],
    shifts: &HashMap<(String, u8), Vec<Shift>>,
) -> Option<EventPlayer> {
    for &period in periods {
        if let Some(entry) = shifts.get(&(team.to_string(), period)) {
            if let Some(s) = entry.iter().find(|s| s.group == PositionGroup::Goalie) {
                return Some(s.player.clone());
            }
        }
    }
    None
}

fn roster_goalie(
    team: &str,
    roster: &[RosterEntry],
    normalizer: &Normalizer,
    season: Season,
) -> Option<EventPlayer> {
    roster
        .iter()
        .find(|r| {
            normalizer.team_code(&r.team) == team
                && PositionGroup::from_code(&r.position) == PositionGroup::Goalie
        })
        .map(|r| {
            let id = normalizer.normalize(&r.name, season, Some(&r.position), Some(r.jersey));
            EventPlayer::new(id.key, id.display_name)
        })
}
