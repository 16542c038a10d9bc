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

//! Construction heuristics. These fill an empty solution; they never touch
//! the base domains, only per-call shadow copies.

mod mcv;
mod ordered;
mod shadow;

pub use mcv::most_constrained_ordering;
pub use ordered::{ValueWeights, ordered_weighted, random_with_ordering};
pub use shadow::ShadowDomains;

use pett_model::prelude::*;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Assign every event in a random order to a uniformly random entry of its
/// base domain. Events with empty base domains stay unassigned.
pub fn random_assignment<R: Rng + ?Sized>(soln: &mut Solution<'_>, rng: &mut R) {
    let inst = soln.instance();
    let mut order: Vec<usize> = (0..inst.n_events()).collect();
    order.shuffle(rng);

    for event in order {
        if let Some(&rat) = inst.base_domain(event).choose(rng) {
            soln.assign(event, rat);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::medium_instance;
    use super::*;
    use pett_core::prelude::SeedSequencer;

    #[test]
    fn test_random_assignment_assigns_every_event_in_domain() {
        let inst = medium_instance();
        let mut rng = SeedSequencer::rng(7);
        let mut soln = inst.solution();
        random_assignment(&mut soln, &mut rng);

        for event in 0..inst.n_events() {
            let rat = soln.rat_at(event);
            assert!(rat.assigned());
            assert!(inst.base_domain(event).contains(&rat));
        }
    }

    #[test]
    fn test_random_assignment_skips_empty_domains() {
        // Event 0 has no feasible room: one room of capacity 0 but two
        // attending students.
        let mut t = InstanceTables::blank(1, 1, 0, 2);
        t.room_capacities = vec![0];
        t.set_attends(0, 0);
        t.set_attends(1, 0);
        let inst = Instance::new(t).unwrap();

        let mut rng = SeedSequencer::rng(7);
        let mut soln = inst.solution();
        random_assignment(&mut soln, &mut rng);
        assert!(!soln.assigned(0));
        assert_eq!(soln.distance(), 2);
    }
}
