//! Score/venue/strength adjustment of shot-class events.
//!
//! A static, pre-derived weight table corrects raw 0/1 shot indicators for
//! score, strength, and venue bias. Adjustment is a pure function of the
//! event and the table: no internal state, bit-reproducible for a given
//! classifier version.

pub mod xg;


pub use xg::{ShotFeatures, ShotQualityModel};

use crate::model::{EnrichedEvent, EventType};
use std::collections::HashMap;

const ADJUSTMENTS_JSON: &str = include_str!("../data/adjustments.json");

/// Maximum score differential the table distinguishes; larger leads clip.
pub const SCORE_DIFF_CLIP: i32 = 3;

/// Stat family a weight applies to. Shots and misses share the fenwick
/// family; blocks share corsi.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatFamily {
    Goal,
    Fenwick,
    Corsi,
}

impl StatFamily {
    fn key(&self, is_home: bool) -> &'static str {
        match (self, is_home) {
            (StatFamily::Goal, true) => "home_goal",
            (StatFamily::Goal, false) => "away_goal",
            (StatFamily::Fenwick, true) => "home_fenwick",
            (StatFamily::Fenwick, false) => "away_fenwick",
            (StatFamily::Corsi, true) => "home_corsi",
            (StatFamily::Corsi, false) => "away_corsi",
        }
    }
}

/// The static adjustment table: strength state -> score differential ->
/// venue+family -> multiplier. Loaded once, immutable for the process
/// lifetime.
#[derive(Debug, Clone)]
pub struct WeightTable {
    table: HashMap<String, HashMap<String, HashMap<String, f64>>>,
}

impl WeightTable {
    pub fn embedded() -> Self {
        let table = serde_json::from_str(ADJUSTMENTS_JSON).unwrap_or_default();
        Self { table }
    }

    /// Look up the multiplier for an acting team's stat.
    ///
    /// Empty-net strength states are never weighted. The table is defined
    /// from the perspective of the team with the extra skater, so
    /// shorthanded states flip perspective entirely (strength reversed,
    /// venue swapped, differential negated) before lookup. Unknown
    /// strength states fall back to 1.
    pub fn weight(
        &self,
        strength_state: &str,
        score_diff: i32,
        is_home: bool,
        family: StatFamily,
    ) -> f64 {
        if strength_state.contains('E') {
            return 1.0;
        }
        let (mut strength, mut diff, mut home) = (strength_state.to_string(), score_diff, is_home);
        if is_shorthanded(strength_state) {
            strength = crate::model::state::reverse_strength(strength_state);
            diff = -diff;
            home = !home;
        }
        let diff = diff.clamp(-SCORE_DIFF_CLIP, SCORE_DIFF_CLIP);
        self.table
            .get(&strength)
            .and_then(|by_diff| by_diff.get(&diff.to_string()))
            .and_then(|row| row.get(family.key(home)))
            .copied()
            .unwrap_or(1.0)
    }
}

/// Whether the acting team is the shorthanded side of a strength state.
fn is_shorthanded(strength_state: &str) -> bool {
    match strength_state.split_once('v') {
        Some((own, opp)) => match (own.parse::<u8>(), opp.parse::<u8>()) {
            (Ok(a), Ok(b)) => a < b,
            _ => false,
        },
        None => false,
    }
}

/// Apply adjusted counting stats and xG to every event in an enriched
/// stream, in order. The prior non-change event supplies rebound/rush
/// context for the classifier.
pub fn apply_adjustments(
    events: &mut [EnrichedEvent],
    table: &WeightTable,
    model: &ShotQualityModel,
) {
    for i in 0..events.len() {
        if !events[i].event_type.is_corsi() {
            continue;
        }
        let prior = events[..i]
            .iter()
            .rev()
            .find(|e| e.event_type != EventType::Change)
            .cloned();
        adjust_event(&mut events[i], prior.as_ref(), table, model);
    }
}

/// Fill `event.adj` and `event.xg` for one shot-class event.
pub fn adjust_event(
    event: &mut EnrichedEvent,
    prior: Option<&EnrichedEvent>,
    table: &WeightTable,
    model: &ShotQualityModel,
) {
    // Goals carry the post-goal score; the weight corrects the shooting
    // environment that existed when the shot was taken.
    let diff = if event.event_type == EventType::Goal {
        event.score_diff() - 1
    } else {
        event.score_diff()
    };

    let w_goal = table.weight(&event.strength_state, diff, event.is_home, StatFamily::Goal);
    let w_fen = table.weight(
        &event.strength_state,
        diff,
        event.is_home,
        StatFamily::Fenwick,
    );
    let w_cor = table.weight(
        &event.strength_state,
        diff,
        event.is_home,
        StatFamily::Corsi,
    );

    let et = event.event_type;
    event.adj.goal_adj = if et == EventType::Goal { w_goal } else { 0.0 };
    event.adj.shot_adj = if et.is_shot_on_goal() { w_fen } else { 0.0 };
    event.adj.miss_adj = if et == EventType::Miss { w_fen } else { 0.0 };
    event.adj.block_adj = if et == EventType::Block { w_cor } else { 0.0 };
    event.adj.fenwick_adj = if et.is_fenwick() { w_fen } else { 0.0 };
    event.adj.corsi_adj = w_cor;

    // Blocked attempts carry the blocker's location, not the shooter's,
    // so the classifier only sees unblocked attempts.
    if et.is_fenwick() {
        let features = shot_features(event, prior, diff);
        let p = model.predict(&features);
        event.xg = Some(p);
        event.adj.xg_adj = p * w_goal;
    }
}

/// Assemble the classifier's fixed feature vector for an unblocked attempt.
pub fn shot_features(
    event: &EnrichedEvent,
    prior: Option<&EnrichedEvent>,
    score_diff: i32,
) -> ShotFeatures {
    let (distance, angle) = match event.coords {
        Some((x, y)) => crate::enrich::shot_geometry(x, y),
        None => (crate::enrich::shot_geometry(0.0, 0.0).0, 0.0),
    };

    let (own_skaters, opp_skaters, opp_empty_net) = strength_parts(event);

    let shooter_is_forward = event
        .p1
        .as_ref()
        .map(|p| {
            event
                .acting_side()
                .forwards
                .iter()
                .any(|on| on.key == p.key)
                || !event
                    .acting_side()
                    .defense
                    .iter()
                    .any(|on| on.key == p.key)
        })
        .unwrap_or(true);

    let mut f = ShotFeatures {
        distance,
        angle,
        shooter_is_forward,
        strength_pp: own_skaters > opp_skaters,
        strength_sh: own_skaters < opp_skaters,
        strength_empty_net: opp_empty_net,
        score_diff: score_diff.clamp(-SCORE_DIFF_CLIP, SCORE_DIFF_CLIP),
        is_home: event.is_home,
        ..Default::default()
    };

    if let Some(prev) = prior {
        let gap = event.game_seconds.saturating_sub(prev.game_seconds);
        f.is_rebound = prev.event_type.is_fenwick() && prev.team == event.team && gap <= 3;
        f.is_rush = gap <= 4
            && (matches!(
                prev.event_type,
                EventType::Give | EventType::Take | EventType::Hit
            ) || prev.coords.map(|(x, _)| x.abs() <= 25.0).unwrap_or(false));
        f.prior_shot = prev.event_type.is_corsi();
        f.prior_faceoff = prev.event_type == EventType::Fac;
        f.prior_giveaway = matches!(prev.event_type, EventType::Give | EventType::Take);
    }

    f
}

fn strength_parts(event: &EnrichedEvent) -> (u8, u8, bool) {
    let (own, opp) = if event.is_home {
        (event.home_skaters, event.away_skaters)
    } else {
        (event.away_skaters, event.home_skaters)
    };
    let opp_empty = event.opposing_side().goalie.is_none();
    (own, opp, opp_empty)
}
