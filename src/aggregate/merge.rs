//! The for/against merge step.
//!
//! A single physical event credits one side's "for" stats and the other
//! side's "against" stats. The two views are computed independently and
//! joined here with an outer join, filling unmatched cells with the zero
//! value, so a player who only ever faced events still gets a row and
//! nothing is double counted. For/against conservation (the sums agree
//! across the two views) is asserted by the aggregation tests.

use super::key::GroupKey;
use std::collections::HashMap;

/// Accumulators that can absorb another instance of themselves.
pub trait Absorb: Default {
    fn absorb(&mut self, other: &Self);
}

/// Outer-join two keyed maps, filling the missing side with `Default`.
pub fn outer_merge<F: Default, A: Default>(
    for_map: HashMap<GroupKey, F>,
    mut against_map: HashMap<GroupKey, A>,
) -> HashMap<GroupKey, (F, A)> {
    let mut merged: HashMap<GroupKey, (F, A)> = HashMap::with_capacity(for_map.len());
    for (key, f) in for_map {
        let a = against_map.remove(&key).unwrap_or_default();
        merged.insert(key, (f, a));
    }
    for (key, a) in against_map {
        merged.insert(key, (F::default(), a));
    }
    merged
}

/// Union a sequence of per-role maps into one, summing collisions.
pub fn union_add<S: Absorb>(maps: Vec<HashMap<GroupKey, S>>) -> HashMap<GroupKey, S> {
    let mut out: HashMap<GroupKey, S> = HashMap::new();
    for map in maps {
        for (key, stats) in map {
            out.entry(key).or_default().absorb(&stats);
        }
    }
    out
}
