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

use super::individual::{Genome, Individual};
use super::ops::{MAX_MUTATE_SHARE, crossover};
use crate::heuristics::random_assignment;
use pett_model::prelude::*;
use rand::Rng;
use rand::seq::{IndexedRandom, index};

/// One slave's bag of individuals, bounded by the population's size window.
#[derive(Debug)]
pub struct SubPopulation<'i> {
    members: Vec<Individual<'i>>,
    min_size: usize,
    max_size: usize,
}

impl<'i> SubPopulation<'i> {
    pub fn new(min_size: usize, max_size: usize) -> Self {
        assert!(
            max_size > min_size,
            "sub-population max size ({max_size}) must exceed min size ({min_size})"
        );
        Self {
            members: Vec::with_capacity(max_size),
            min_size,
            max_size,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.members.len() == self.max_size
    }

    #[inline]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Fill up to the minimum size with random individuals; returns the best
    /// of the batch for publishing upstream.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        inst: &'i Instance,
        rng: &mut R,
    ) -> (Vec<Rat>, Value) {
        let mut best_value = Value::WORST;
        let mut best_rats = Vec::new();

        while self.members.len() < self.min_size {
            let mut soln = inst.solution();
            random_assignment(&mut soln, rng);
            let value = soln.value();
            if value < best_value {
                best_value = value;
                best_rats = soln.assignments();
            }
            self.insert(Individual::with_value(soln, value));
        }

        (best_rats, best_value)
    }

    pub fn insert(&mut self, individual: Individual<'i>) {
        assert!(
            !self.is_full(),
            "insert into a full sub-population (protocol bug)"
        );
        self.members.push(individual);
    }

    /// Uniformly pick a member and snapshot it.
    pub fn pick_export<R: Rng + ?Sized>(&self, rng: &mut R) -> Genome {
        self.members
            .choose(rng)
            .expect("pick from an empty sub-population")
            .export()
    }

    /// Crossover of two distinct members; the caller inserts the child.
    pub fn local_crossover<R: Rng + ?Sized>(
        &self,
        inst: &'i Instance,
        rng: &mut R,
    ) -> Option<(Solution<'i>, Value)> {
        if self.members.len() < 2 {
            return None;
        }
        let mother = rng.random_range(0..self.members.len());
        let mut father = rng.random_range(0..self.members.len() - 1);
        if father >= mother {
            father += 1;
        }
        Some(crossover(
            inst,
            &self.members[mother],
            &self.members[father],
            rng,
        ))
    }

    /// Clone one member and re-roll a handful of its chromosomes from their
    /// base domains. The caller inserts the mutant.
    pub fn mutate_one<R: Rng + ?Sized>(
        &self,
        inst: &'i Instance,
        rng: &mut R,
    ) -> (Solution<'i>, Value) {
        let picked = self
            .members
            .choose(rng)
            .expect("mutate in an empty sub-population");
        let mut mutant = picked.soln().duplicate();

        let n_events = inst.n_events();
        let max_mutations = ((n_events as f64 * MAX_MUTATE_SHARE) as usize).max(1);
        let n_mutations = rng.random_range(1..=max_mutations);

        for event in index::sample(rng, n_events, n_mutations) {
            if let Some(&rat) = inst.base_domain(event).choose(rng) {
                mutant.assign(event, rat);
            }
        }

        let value = mutant.value();
        (mutant, value)
    }

    /// The cached valuation of one member.
    #[inline]
    pub fn member_value(&self, index: usize) -> Value {
        self.members[index].value()
    }

    /// Empty the bag, handing the members to the caller (selection).
    pub(crate) fn take_members(&mut self) -> Vec<Individual<'i>> {
        std::mem::take(&mut self.members)
    }
}
