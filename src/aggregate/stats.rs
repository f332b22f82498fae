//! Counting-stat accumulators and row emission.

use super::merge::Absorb;
use crate::model::{EnrichedEvent, EventType};
use serde_json::{Map, Value};

/// One side's on-ice counting stats: generated ("for") or conceded
/// ("against") depending on which map the accumulator lives in. TOI is in
/// seconds internally, minutes on emission.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SideStats {
    pub toi: f64,
    pub g: f64,
    pub s: f64,
    pub ms: f64,
    pub bs: f64,
    pub f: f64,
    pub c: f64,
    pub xg: f64,
    pub g_adj: f64,
    pub s_adj: f64,
    pub ms_adj: f64,
    pub bs_adj: f64,
    pub f_adj: f64,
    pub c_adj: f64,
    pub xg_adj: f64,
}

impl SideStats {
    /// Count one shot-class event generated while this side was on.
    pub fn count_event(&mut self, event: &EnrichedEvent) {
        let et = event.event_type;
        if !et.is_corsi() {
            return;
        }
        if et == EventType::Goal {
            self.g += 1.0;
        }
        if et.is_shot_on_goal() {
            self.s += 1.0;
        }
        if et == EventType::Miss {
            self.ms += 1.0;
        }
        if et == EventType::Block {
            self.bs += 1.0;
        }
        if et.is_fenwick() {
            self.f += 1.0;
        }
        self.c += 1.0;
        self.xg += event.xg.unwrap_or(0.0);
        self.g_adj += event.adj.goal_adj;
        self.s_adj += event.adj.shot_adj;
        self.ms_adj += event.adj.miss_adj;
        self.bs_adj += event.adj.block_adj;
        self.f_adj += event.adj.fenwick_adj;
        self.c_adj += event.adj.corsi_adj;
        self.xg_adj += event.adj.xg_adj;
    }
}

impl Absorb for SideStats {
    fn absorb(&mut self, other: &Self) {
        self.toi += other.toi;
        self.g += other.g;
        self.s += other.s;
        self.ms += other.ms;
        self.bs += other.bs;
        self.f += other.f;
        self.c += other.c;
        self.xg += other.xg;
        self.g_adj += other.g_adj;
        self.s_adj += other.s_adj;
        self.ms_adj += other.ms_adj;
        self.bs_adj += other.bs_adj;
        self.f_adj += other.f_adj;
        self.c_adj += other.c_adj;
        self.xg_adj += other.xg_adj;
    }
}

/// Individual (role-attributed) counting stats. TOI in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndStats {
    pub toi: f64,
    pub g: f64,
    pub a1: f64,
    pub a2: f64,
    pub isf: f64,
    pub imsf: f64,
    pub ibf: f64,
    pub ixg: f64,
    pub blk: f64,
    pub fow: f64,
    pub fol: f64,
    pub pent: f64,
    pub pend: f64,
    pub give: f64,
    pub take: f64,
    pub hits: f64,
    pub hits_taken: f64,
}

impl IndStats {
    /// Unblocked individual attempts.
    pub fn iff(&self) -> f64 {
        self.isf + self.imsf
    }

    /// All individual attempts, blocked included.
    pub fn icf(&self) -> f64 {
        self.isf + self.imsf + self.ibf
    }
}

impl Absorb for IndStats {
    fn absorb(&mut self, other: &Self) {
        self.toi += other.toi;
        self.g += other.g;
        self.a1 += other.a1;
        self.a2 += other.a2;
        self.isf += other.isf;
        self.imsf += other.imsf;
        self.ibf += other.ibf;
        self.ixg += other.ixg;
        self.blk += other.blk;
        self.fow += other.fow;
        self.fol += other.fol;
        self.pent += other.pent;
        self.pend += other.pend;
        self.give += other.give;
        self.take += other.take;
        self.hits += other.hits;
        self.hits_taken += other.hits_taken;
    }
}

/// Guarded share: `for / (for + against)`, defaulting to 1.0 when only a
/// "for" count exists and 0.0 when only an "against" count exists.
pub fn percent(for_val: f64, against_val: f64) -> f64 {
    if for_val == 0.0 {
        0.0
    } else if against_val == 0.0 {
        1.0
    } else {
        for_val / (for_val + against_val)
    }
}

/// Rate per sixty minutes given TOI in minutes.
pub fn per_sixty(stat: f64, toi_minutes: f64) -> f64 {
    if toi_minutes <= 0.0 {
        0.0
    } else {
        stat / toi_minutes * 60.0
    }
}

pub fn put(row: &mut Map<String, Value>, name: &str, value: f64) {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    row.insert(
        name.to_string(),
        Value::from(if rounded == 0.0 { 0.0 } else { rounded }),
    );
}

/// Emit the on-ice stat columns for a merged (for, against) pair.
/// TOI arrives in seconds and is emitted in minutes.
pub fn put_onice_columns(row: &mut Map<String, Value>, forv: &SideStats, against: &SideStats) {
    let toi_minutes = (forv.toi + against.toi) / 60.0;
    put(row, "toi", toi_minutes);
    put(row, "gf", forv.g);
    put(row, "ga", against.g);
    put(row, "sf", forv.s);
    put(row, "sa", against.s);
    put(row, "msf", forv.ms);
    put(row, "msa", against.ms);
    put(row, "bsf", forv.bs);
    put(row, "bsa", against.bs);
    put(row, "ff", forv.f);
    put(row, "fa", against.f);
    put(row, "cf", forv.c);
    put(row, "ca", against.c);
    put(row, "xgf", forv.xg);
    put(row, "xga", against.xg);
    put(row, "gf_adj", forv.g_adj);
    put(row, "ga_adj", against.g_adj);
    put(row, "sf_adj", forv.s_adj);
    put(row, "sa_adj", against.s_adj);
    put(row, "ff_adj", forv.f_adj);
    put(row, "fa_adj", against.f_adj);
    put(row, "cf_adj", forv.c_adj);
    put(row, "ca_adj", against.c_adj);
    put(row, "xgf_adj", forv.xg_adj);
    put(row, "xga_adj", against.xg_adj);
    put(row, "gf_percent", percent(forv.g, against.g));
    put(row, "sf_percent", percent(forv.s, against.s));
    put(row, "ff_percent", percent(forv.f, against.f));
    put(row, "cf_percent", percent(forv.c, against.c));
    put(row, "xgf_percent", percent(forv.xg, against.xg));
    put(row, "gf_p60", per_sixty(forv.g, toi_minutes));
    put(row, "ga_p60", per_sixty(against.g, toi_minutes));
    put(row, "xgf_p60", per_sixty(forv.xg, toi_minutes));
    put(row, "xga_p60", per_sixty(against.xg, toi_minutes));
}

/// Emit the individual stat columns.
pub fn put_individual_columns(row: &mut Map<String, Value>, ind: &IndStats) {
    let toi_minutes = ind.toi / 60.0;
    put(row, "toi", toi_minutes);
    put(row, "g", ind.g);
    put(row, "a1", ind.a1);
    put(row, "a2", ind.a2);
    put(row, "isf", ind.isf);
    put(row, "imsf", ind.imsf);
    put(row, "iff", ind.iff());
    put(row, "icf", ind.icf());
    put(row, "ixg", ind.ixg);
    put(row, "blk", ind.blk);
    put(row, "fow", ind.fow);
    put(row, "fol", ind.fol);
    put(row, "pent", ind.pent);
    put(row, "pend", ind.pend);
    put(row, "give", ind.give);
    put(row, "take", ind.take);
    put(row, "hits", ind.hits);
    put(row, "hits_taken", ind.hits_taken);
    put(row, "g_p60", per_sixty(ind.g, toi_minutes));
    put(row, "a1_p60", per_sixty(ind.a1, toi_minutes));
    put(row, "a2_p60", per_sixty(ind.a2, toi_minutes));
    put(row, "isf_p60", per_sixty(ind.isf, toi_minutes));
    put(row, "icf_p60", per_sixty(ind.icf(), toi_minutes));
    put(row, "ixg_p60", per_sixty(ind.ixg, toi_minutes));
    put(row, "blk_p60", per_sixty(ind.blk, toi_minutes));
}
