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

mod individual;
mod ops;
mod subpop;

pub use individual::{CrossoverParent, Genome, Individual, Success};
pub use ops::crossover;
pub use subpop::SubPopulation;

use parking_lot::Mutex;
use pett_model::prelude::*;

/// The island-level population: `count` sub-populations, each the working
/// set of one slave. The sub-population is the unit of locking; the full-
/// population protocol guarantees every slave is parked before selection
/// takes all of them at once.
#[derive(Debug)]
pub struct Population<'i> {
    subpops: Vec<Mutex<SubPopulation<'i>>>,
    min_size: usize,
    count: usize,
}

impl<'i> Population<'i> {
    pub fn new(min_size: usize, max_size: usize, count: usize) -> Self {
        Self {
            subpops: (0..count)
                .map(|_| Mutex::new(SubPopulation::new(min_size, max_size)))
                .collect(),
            min_size,
            count,
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn subpop(&self, index: usize) -> &Mutex<SubPopulation<'i>> {
        &self.subpops[index]
    }

    /// Selection may only run once every sub-population has filled up.
    pub fn should_select(&self) -> bool {
        self.subpops.iter().all(|sp| sp.lock().is_full())
    }

    /// Global selection: sort everything, keep the lexicographically best
    /// slice, and deal it back across the sub-populations in a snake so the
    /// strongest individuals spread out instead of clumping. Injected
    /// outsiders (drained evenly from `inject`, remainder left in place)
    /// take the reserved tail slots of every sub-population; every
    /// sub-population ends at exactly `min_size`. Evicted solutions go back
    /// to the instance pool.
    pub fn select(&self, inst: &'i Instance, inject: &mut Vec<(Vec<Rat>, Value)>) {
        let mut all: Vec<Individual<'i>> = Vec::with_capacity(self.count * self.min_size);
        for sp in &self.subpops {
            all.append(&mut sp.lock().take_members());
        }
        all.sort_by_key(|ind| ind.value());

        let per_pop_injected = (inject.len() / self.count).min(self.min_size);
        let keep_per_pop = self.min_size - per_pop_injected;
        let keep_total = keep_per_pop * self.count;

        let mut piles: Vec<Vec<Individual<'i>>> = (0..self.count)
            .map(|_| Vec::with_capacity(self.min_size))
            .collect();
        for (pick, individual) in all.drain(..keep_total).enumerate() {
            let row = pick / self.count;
            let column = pick % self.count;
            let pile = if row % 2 == 0 {
                column
            } else {
                self.count - 1 - column
            };
            piles[pile].push(individual);
        }

        for evicted in all {
            inst.release(evicted.into_solution());
        }

        for (pile, sp) in piles.into_iter().zip(&self.subpops) {
            let mut sp = sp.lock();
            for individual in pile {
                sp.insert(individual);
            }
            for (rats, value) in inject.drain(..per_pop_injected) {
                sp.insert(Individual::with_value(inst.solution_from(&rats), value));
            }
            debug_assert_eq!(sp.len(), self.min_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::test_support::medium_instance;

    const MIN: usize = 4;
    const MAX: usize = 6;
    const COUNT: usize = 3;

    /// One student attending 20 events, one big room. Stacking the first
    /// k events onto a single slot yields a strictly increasing violation
    /// count, which gives every individual a distinct, known rank.
    fn stack_instance() -> Instance {
        let mut t = InstanceTables::blank(20, 1, 0, 1);
        t.room_capacities = vec![20];
        for event in 0..20 {
            t.set_attends(0, event);
        }
        Instance::new(t).unwrap()
    }

    /// Fill every sub-population to the maximum with individuals of strictly
    /// increasing (known) value, in rank order across the sub-populations.
    fn full_population<'i>(inst: &'i Instance) -> (Population<'i>, Vec<Value>) {
        let pop = Population::new(MIN, MAX, COUNT);
        let mut values = Vec::new();
        let mut rank = 0;
        for index in 0..COUNT {
            let mut sp = pop.subpop(index).lock();
            while !sp.is_full() {
                let mut soln = inst.solution();
                for event in 0..=rank {
                    soln.assign(event, Rat::new(0, 0));
                }
                let value = soln.value();
                values.push(value);
                sp.insert(Individual::with_value(soln, value));
                rank += 1;
            }
        }
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        (pop, values)
    }

    #[test]
    fn test_should_select_only_when_all_full() {
        let inst = medium_instance();
        let pop = Population::new(MIN, MAX, COUNT);
        assert!(!pop.should_select());

        for index in 0..COUNT {
            let mut sp = pop.subpop(index).lock();
            while !sp.is_full() {
                sp.insert(Individual::new(inst.solution()));
            }
            drop(sp);
            assert_eq!(pop.should_select(), index == COUNT - 1);
        }
    }

    #[test]
    fn test_select_keeps_the_lex_smallest_slice() {
        let inst = stack_instance();
        let (pop, sorted_values) = full_population(&inst);

        let mut inject = Vec::new();
        pop.select(&inst, &mut inject);

        let mut kept: Vec<Value> = Vec::new();
        for index in 0..COUNT {
            let sp = pop.subpop(index).lock();
            assert_eq!(sp.len(), MIN);
            for i in 0..MIN {
                kept.push(sp.member_value(i));
            }
        }
        kept.sort();
        assert_eq!(kept, sorted_values[..COUNT * MIN].to_vec());
    }

    #[test]
    fn test_select_snakes_the_best_across_subpops() {
        let inst = stack_instance();
        let (pop, sorted_values) = full_population(&inst);
        let mut inject = Vec::new();
        pop.select(&inst, &mut inject);

        // The three best individuals land in three different sub-populations.
        let best = &sorted_values[..COUNT];
        for index in 0..COUNT {
            let sp = pop.subpop(index).lock();
            let hits = (0..sp.len())
                .filter(|&i| best.contains(&sp.member_value(i)))
                .count();
            assert_eq!(hits, 1, "sub-population {index} holds {hits} of the top 3");
        }
    }

    #[test]
    fn test_select_injects_evenly_and_leaves_remainder() {
        let inst = stack_instance();
        let (pop, _) = full_population(&inst);

        // Seven outsiders: two per sub-population fit, one remains.
        let mut inject: Vec<_> = (0..7)
            .map(|i| {
                let mut soln = inst.solution();
                soln.assign(1, Rat::new(0, i as u32));
                let value = soln.value();
                let rats = soln.assignments();
                inst.release(soln);
                (rats, value)
            })
            .collect();

        pop.select(&inst, &mut inject);
        assert_eq!(inject.len(), 1);
        for index in 0..COUNT {
            assert_eq!(pop.subpop(index).lock().len(), MIN);
        }
    }

    #[test]
    fn test_select_frees_evicted_solutions_to_the_pool() {
        let inst = stack_instance();
        let (pop, _) = full_population(&inst);
        let before = inst.pooled();
        let mut inject = Vec::new();
        pop.select(&inst, &mut inject);
        // count * (max - min) individuals were evicted.
        assert_eq!(inst.pooled(), before + COUNT * (MAX - MIN));
    }
}
