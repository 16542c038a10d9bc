// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use super::shadow::ShadowDomains;
use pett_model::prelude::*;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashMap;

/// Per-(event, rat) weights derived by the hill-climbing metaheuristic.
/// Weights are strictly positive; rats that were never observed take the
/// table's baseline weight.
#[derive(Debug, Clone)]
pub struct ValueWeights {
    tables: Vec<HashMap<Rat, u32>>,
    baseline: u32,
}

impl ValueWeights {
    pub fn new(tables: Vec<HashMap<Rat, u32>>, baseline: u32) -> Self {
        assert!(baseline > 0, "value weights must be strictly positive");
        debug_assert!(tables.iter().flat_map(|t| t.values()).all(|&w| w > 0));
        Self { tables, baseline }
    }

    /// Uniform weights: every rat of every event weighs 1.
    pub fn uniform(n_events: usize) -> Self {
        Self {
            tables: vec![HashMap::new(); n_events],
            baseline: 1,
        }
    }

    #[inline]
    pub fn weight(&self, event: usize, rat: Rat) -> u32 {
        self.tables[event]
            .get(&rat)
            .copied()
            .unwrap_or(self.baseline)
    }
}

/// Assign events in the given order, picking uniformly from the live shadow
/// domain and forward-propagating after every assignment. Events whose
/// shadow domain runs dry are assigned a random base-domain entry at the end.
pub fn random_with_ordering<R: Rng + ?Sized>(
    soln: &mut Solution<'_>,
    order: &[u32],
    rng: &mut R,
) {
    construct_with_ordering(soln, order, rng, |entries, _event, rng| {
        entries.choose(rng).copied()
    });
}

/// Like [`random_with_ordering`], but the value is drawn by weighted
/// reservoir sampling of size one over the live shadow domain.
pub fn ordered_weighted<R: Rng + ?Sized>(
    soln: &mut Solution<'_>,
    order: &[u32],
    weights: &ValueWeights,
    rng: &mut R,
) {
    construct_with_ordering(soln, order, rng, |entries, event, rng| {
        let mut chosen = None;
        let mut total = 0u64;
        for &rat in entries {
            let w = weights.weight(event, rat) as u64;
            total += w;
            if rng.random_range(0..total) < w {
                chosen = Some(rat);
            }
        }
        chosen
    });
}

fn construct_with_ordering<R, P>(soln: &mut Solution<'_>, order: &[u32], rng: &mut R, mut pick: P)
where
    R: Rng + ?Sized,
    P: FnMut(&[Rat], usize, &mut R) -> Option<Rat>,
{
    let inst = soln.instance();
    let mut shadow = ShadowDomains::new(inst);

    for &event in order {
        let event = event as usize;
        if let Some(rat) = pick(shadow.entries(event), event, rng) {
            soln.assign(event, rat);
            shadow.propagate(soln, event, rat);
        }
    }

    // Whatever went domain-empty falls back to the base domain.
    for event in 0..inst.n_events() {
        if !soln.assigned(event)
            && let Some(&rat) = inst.base_domain(event).choose(rng)
        {
            soln.assign(event, rat);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::medium_instance;
    use super::*;
    use pett_core::prelude::SeedSequencer;

    fn identity_order(n: usize) -> Vec<u32> {
        (0..n as u32).collect()
    }

    #[test]
    fn test_random_with_ordering_assigns_everything() {
        let inst = medium_instance();
        let mut rng = SeedSequencer::rng(11);
        let mut soln = inst.solution();
        random_with_ordering(&mut soln, &identity_order(inst.n_events()), &mut rng);

        for event in 0..inst.n_events() {
            assert!(soln.assigned(event));
            assert!(inst.base_domain(event).contains(&soln.rat_at(event)));
        }
    }

    #[test]
    fn test_ordering_respects_propagated_precedence() {
        // Event 0 can only sit at time 5, so once the identity ordering has
        // placed it, event 1's shadow domain holds strictly later times and
        // the precedence cannot be broken by the ordered phase.
        let mut t = InstanceTables::blank(2, 1, 0, 1);
        t.room_capacities = vec![2];
        t.set_attends(0, 0);
        for time in 0..NTIMES {
            t.set_time_available(0, time, time == 5);
        }
        t.set_before(0, 1);
        let inst = Instance::new(t).unwrap();

        for seed in 0..20 {
            let mut rng = SeedSequencer::rng(seed);
            let mut soln = inst.solution();
            random_with_ordering(&mut soln, &[0, 1], &mut rng);
            assert!(
                soln.rat_at(1).after(soln.rat_at(0)),
                "seed {seed}: precedence 0 -> 1 broken by ordered construction"
            );
        }
    }

    #[test]
    fn test_weighted_pick_honours_heavy_weight() {
        // Give one rat an overwhelming weight; the sampler must essentially
        // always take it.
        let inst = medium_instance();
        let favourite = Rat::new(1, 17);
        let mut tables = vec![HashMap::new(); inst.n_events()];
        tables[0].insert(favourite, 1_000_000u32);
        let weights = ValueWeights::new(tables, 1);

        let mut hits = 0;
        for seed in 0..50 {
            let mut rng = SeedSequencer::rng(seed);
            let mut soln = inst.solution();
            ordered_weighted(&mut soln, &[0], &weights, &mut rng);
            if soln.rat_at(0) == favourite {
                hits += 1;
            }
        }
        assert!(hits >= 48, "heavy weight picked only {hits}/50 times");
    }

    #[test]
    fn test_uniform_weights_are_strictly_positive() {
        let w = ValueWeights::uniform(3);
        assert_eq!(w.weight(0, Rat::new(0, 0)), 1);
        assert_eq!(w.weight(2, Rat::new(5, 44)), 1);
    }

    #[test]
    fn test_domain_empty_events_fall_back_to_base_domain() {
        // Two mutually exclusive events with a single common available time:
        // whichever goes second runs dry and must still end up assigned.
        let mut t = InstanceTables::blank(2, 1, 0, 1);
        t.room_capacities = vec![2];
        t.set_attends(0, 0);
        t.set_attends(0, 1);
        for time in 1..NTIMES {
            t.set_time_available(0, time, false);
            t.set_time_available(1, time, false);
        }
        let inst = Instance::new(t).unwrap();

        let mut rng = SeedSequencer::rng(3);
        let mut soln = inst.solution();
        random_with_ordering(&mut soln, &[0, 1], &mut rng);

        assert!(soln.assigned(0));
        assert!(soln.assigned(1));
        assert_eq!(soln.rat_at(1), Rat::new(0, 0));
    }
}
